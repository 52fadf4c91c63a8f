/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional "T"/"Tháng" prefix, a 1-2 digit month, one separator out of
    /// {/, space, ., ,, -} and a 4 digit year.
    static ref VIETNAMESE_MONTH: Regex =
        Regex::new(r"(?:[Tt]háng|[Tt])?\s*(\d{1,2})\s*[/\s.,-]\s*(\d{4})").unwrap();
    /// The value of an HTML month input, as the search filters submit it.
    static ref ISO_MONTH: Regex = Regex::new(r"^\s*(\d{4})-(\d{1,2})\s*$").unwrap();
}

/// A month a client would like the training to happen in, extracted from the
/// free-text "preferred time" field ("T11/2024", "Tháng 3 2023") or from a
/// month-input value ("2024-11").
///
/// The single parser is shared by the date-range filter and the "soonest"
/// ordering so both sides always agree on what a string means. Anything
/// without a readable month degrades to `None`, malformed input never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreferredMonth {
    year: u16,
    month: u8,
}

impl PreferredMonth {
    pub fn new(month: u8, year: u16) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(captures) = ISO_MONTH.captures(raw) {
            let year = captures[1].parse::<u16>().ok()?;
            let month = captures[2].parse::<u8>().ok()?;

            return Self::new(month, year);
        }

        let captures = VIETNAMESE_MONTH.captures(raw)?;
        let month = captures[1].parse::<u8>().ok()?;
        let year = captures[2].parse::<u16>().ok()?;

        Self::new(month, year)
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }
}

#[cfg(test)]
mod tests {
    use super::PreferredMonth;

    fn parsed(raw: &str) -> Option<(u8, u16)> {
        PreferredMonth::parse(raw).map(|month| (month.month(), month.year()))
    }

    #[test]
    fn test_vietnamese_conventions() {
        assert_eq!(Some((11, 2024)), parsed("T11/2024"));
        assert_eq!(Some((3, 2023)), parsed("Tháng 3 2023"));
        assert_eq!(Some((12, 2024)), parsed("Tháng 12 2024"));
        assert_eq!(Some((1, 2025)), parsed("t1.2025"));
        assert_eq!(Some((7, 2024)), parsed("7-2024"));
        assert_eq!(Some((5, 2024)), parsed("khoảng 5/2024 nếu được"));
    }

    #[test]
    fn test_month_input() {
        assert_eq!(Some((11, 2024)), parsed("2024-11"));
        assert_eq!(Some((2, 2025)), parsed("2025-02"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(None, parsed("invalid"));
        assert_eq!(None, parsed(""));
        assert_eq!(None, parsed("cuối năm"));
        // month out of range
        assert_eq!(None, parsed("T13/2024"));
        assert_eq!(None, parsed("0/2024"));
        assert_eq!(None, parsed("2024-13"));
    }

    #[test]
    fn test_ordering() {
        let earlier = PreferredMonth::parse("T11/2024").unwrap();
        let later = PreferredMonth::parse("T1/2025").unwrap();
        assert!(earlier < later);

        let same = PreferredMonth::parse("Tháng 11 2024").unwrap();
        assert_eq!(earlier, same);
    }
}
