use chrono::{Duration, NaiveDate};
use crossterm::event::KeyCode;

/// Date field edited either by typing `YYYYMMDD` or by stepping a day at a
/// time with Left/Right. `Delete` clears an optional date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateInput {
    value: Option<NaiveDate>,
    typed: String,
    optional: bool,
}

impl DateInput {
    pub fn required(value: NaiveDate) -> Self {
        Self {
            value: Some(value),
            typed: String::new(),
            optional: false,
        }
    }

    pub fn optional(value: Option<NaiveDate>) -> Self {
        Self {
            value,
            typed: String::new(),
            optional: true,
        }
    }

    pub fn value(&self) -> Option<NaiveDate> {
        self.value
    }

    pub fn is_typing(&self) -> bool {
        !self.typed.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) if c.is_ascii_digit() && self.typed.len() < 8 => {
                self.typed.push(c);
                if self.typed.len() == 8 {
                    self.commit();
                }
            }
            KeyCode::Backspace => {
                self.typed.pop();
            }
            KeyCode::Delete if self.optional => {
                self.typed.clear();
                self.value = None;
            }
            KeyCode::Left => self.step(-1),
            KeyCode::Right => self.step(1),
            _ => {}
        }
    }

    fn step(&mut self, days: i64) {
        self.typed.clear();
        let base = self
            .value
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        self.value = base.checked_add_signed(Duration::days(days)).or(Some(base));
    }

    /// Applies a complete typed date; partial or impossible input is
    /// dropped and the previous value kept. Returns whether it applied.
    pub fn commit(&mut self) -> bool {
        let typed = std::mem::take(&mut self.typed);
        if typed.len() != 8 {
            return false;
        }
        match NaiveDate::parse_from_str(&typed, "%Y%m%d") {
            Ok(date) => {
                self.value = Some(date);
                true
            }
            Err(_) => false,
        }
    }

    pub fn display(&self) -> String {
        if self.is_typing() {
            let mut shown = "YYYYMMDD".to_string();
            shown.replace_range(..self.typed.len(), &self.typed);
            return format!("{}-{}-{}", &shown[..4], &shown[4..6], &shown[6..]);
        }
        match self.value {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "Not set".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_digits(input: &mut DateInput, digits: &str) {
        for c in digits.chars() {
            input.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn eight_digits_commit_a_date() {
        let mut input = DateInput::required(date(2024, 1, 1));
        type_digits(&mut input, "2024022");
        assert_eq!(input.display(), "2024-02-2D");
        type_digits(&mut input, "9");
        assert_eq!(input.value(), Some(date(2024, 2, 29)));
        assert!(!input.is_typing());
    }

    #[test]
    fn impossible_dates_keep_previous_value() {
        let mut input = DateInput::required(date(2024, 1, 1));
        type_digits(&mut input, "20230229");
        assert_eq!(input.value(), Some(date(2024, 1, 1)));

        type_digits(&mut input, "2023");
        assert!(!input.commit());
        assert_eq!(input.value(), Some(date(2024, 1, 1)));
    }

    #[test]
    fn arrows_step_across_month_ends() {
        let mut input = DateInput::required(date(2024, 2, 29));
        input.handle_key(KeyCode::Right);
        assert_eq!(input.value(), Some(date(2024, 3, 1)));
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Left);
        assert_eq!(input.value(), Some(date(2024, 2, 28)));
    }

    #[test]
    fn only_optional_dates_clear() {
        let mut required = DateInput::required(date(2024, 5, 1));
        required.handle_key(KeyCode::Delete);
        assert_eq!(required.value(), Some(date(2024, 5, 1)));

        let mut optional = DateInput::optional(Some(date(2024, 5, 1)));
        optional.handle_key(KeyCode::Delete);
        assert_eq!(optional.value(), None);
        assert_eq!(optional.display(), "Not set");
    }
}
