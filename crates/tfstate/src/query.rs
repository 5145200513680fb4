//! Lookup addresses
//!
//! `output.user.name`, `module.network["eu"].aws_vpc.main.id`, `data.aws_ami.base[0].tags["Name"]`
use crate::LookupError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Name(String),
    Index(usize),
    Key(String),
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Key(key) => write!(f, "[{key:?}]"),
        }
    }
}

pub(crate) fn parse(query: &str) -> Result<Vec<Segment>, LookupError> {
    let invalid = || LookupError::InvalidQuery(query.to_string());

    let mut segments = Vec::new();
    let mut chars = query.chars().peekable();
    let mut expect_name = true;

    while let Some(&c) = chars.peek() {
        match c {
            '.' if !expect_name => {
                chars.next();
                expect_name = true;
            }
            '[' => {
                if segments.is_empty() {
                    return Err(invalid());
                }
                chars.next();
                segments.push(parse_index(&mut chars).ok_or_else(invalid)?);
                expect_name = false;
            }
            c if expect_name && c != '.' && c != ']' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if matches!(c, '.' | '[' | ']') {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                segments.push(Segment::Name(name));
                expect_name = false;
            }
            _ => return Err(invalid()),
        }
    }

    if expect_name {
        return Err(invalid());
    }
    Ok(segments)
}

/// Parses what follows an opening bracket, including the closing one
fn parse_index(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Segment> {
    let segment = if chars.peek() == Some(&'"') {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next()? {
                '"' => break,
                '\\' => key.push(chars.next()?),
                c => key.push(c),
            }
        }
        Segment::Key(key)
    } else {
        let mut digits = String::new();
        while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            chars.next();
        }
        Segment::Index(digits.parse().ok()?)
    };

    (chars.next()? == ']').then_some(segment)
}
