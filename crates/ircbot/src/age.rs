use chrono::{Datelike, Local};
use nom::{
    IResult, Parser,
    bytes::complete::take_while_m_n,
    character::complete::char,
};

use crate::config::INVALID_DATE_FORMAT;

// !age <YYYY-MM-DD>: strict format, year in [1900, current year], month and
// day checked against the civil calendar. The answer is the exact elapsed
// (years, months, days) using borrow arithmetic, not an average-length
// approximation.

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && year % 100 != 0 || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn digits<'a>(count: usize) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    take_while_m_n(count, count, |c: char| c.is_ascii_digit())
}

fn date_parser(input: &str) -> IResult<&str, (i32, u32, u32)> {
    let (rem, (year, _, month, _, day)) =
        (digits(4), char('-'), digits(2), char('-'), digits(2)).parse(input)?;
    // the fields are pure digits at this point
    Ok((
        rem,
        (
            year.parse().unwrap_or(0),
            month.parse().unwrap_or(0),
            day.parse().unwrap_or(0),
        ),
    ))
}

/// Strict `YYYY-MM-DD`; anything trailing disqualifies the input.
pub fn parse_date(input: &str) -> Option<(i32, u32, u32)> {
    match date_parser(input) {
        Ok(("", date)) => Some(date),
        _ => None,
    }
}

pub fn is_valid_birth_date(
    (year, month, day): (i32, u32, u32),
    today: (i32, u32, u32),
) -> bool {
    if year < 1900 || year > today.0 {
        return false;
    }
    if !(1..=12).contains(&month) {
        return false;
    }
    if day < 1 || day > days_in_month(year, month) {
        return false;
    }
    // a birth date in the future has no age
    (year, month, day) <= today
}

/// Civil-calendar difference from `birth` to `today`: subtract years, then
/// months with borrow, then days borrowing from the month preceding today.
pub fn civil_age(birth: (i32, u32, u32), today: (i32, u32, u32)) -> (i32, i32, i32) {
    let (birth_year, birth_month, birth_day) = birth;
    let (year, month, day) = today;

    let mut years = year - birth_year;
    let mut months = month as i32 - birth_month as i32;
    let mut days = day as i32 - birth_day as i32;

    if days < 0 {
        months -= 1;
        let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
        days += days_in_month(prev_year, prev_month) as i32;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    (years, months, days)
}

pub fn today() -> (i32, u32, u32) {
    let now = Local::now().date_naive();
    (now.year(), now.month(), now.day())
}

/// Full `!age` pipeline: parse, validate against `today`, and phrase the
/// reply. Invalid input gets the fixed usage message.
pub fn age_reply_at(input: Option<&str>, today: (i32, u32, u32)) -> String {
    let birth = input.and_then(parse_date);
    match birth {
        Some(birth) if is_valid_birth_date(birth, today) => {
            let (years, months, days) = civil_age(birth, today);
            format!("You are: {years} years, {months} months, {days} days old")
        }
        _ => INVALID_DATE_FORMAT.to_string(),
    }
}

pub fn age_reply(input: Option<&str>) -> String {
    age_reply_at(input, today())
}
