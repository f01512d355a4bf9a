//! 訂貨週期日曆

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{ProcureError, Result};

/// 訂貨週期日曆
///
/// 預設週一與週四為訂貨日，分析期間的起訖必須落在訂貨日上。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCycleCalendar {
    /// 日曆ID
    pub calendar_id: String,

    /// 訂貨日（索引 0 = 週一, ..., 6 = 週日）
    pub order_days: [bool; 7],

    /// 不訂貨的節假日
    pub holidays: Vec<NaiveDate>,
}

impl OrderCycleCalendar {
    /// 創建新的訂貨日曆（週一、週四）
    pub fn new(calendar_id: String) -> Self {
        Self {
            calendar_id,
            order_days: [true, false, false, true, false, false, false],
            holidays: Vec::new(),
        }
    }

    /// 建構器模式：設置訂貨日
    pub fn with_order_days(mut self, order_days: [bool; 7]) -> Self {
        self.order_days = order_days;
        self
    }

    /// 建構器模式：設置節假日
    pub fn with_holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = holidays;
        self
    }

    /// 添加節假日
    pub fn add_holiday(&mut self, date: NaiveDate) {
        if !self.holidays.contains(&date) {
            self.holidays.push(date);
            self.holidays.sort();
        }
    }

    /// 檢查是否為訂貨日
    pub fn is_order_day(&self, date: NaiveDate) -> bool {
        if self.holidays.contains(&date) {
            return false;
        }

        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.order_days[weekday_index]
    }

    /// 驗證分析期間：結束日必須晚於開始日，且兩端都是訂貨日
    pub fn validate_period(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if end <= start {
            return Err(ProcureError::InvalidPeriod(format!(
                "結束日 {} 必須晚於開始日 {}",
                end, start
            )));
        }

        for (label, date) in [("開始日", start), ("結束日", end)] {
            if !self.is_order_day(date) {
                return Err(ProcureError::PeriodNotAligned(format!(
                    "{} {}（{}）不是訂貨日",
                    label,
                    date,
                    date.weekday()
                )));
            }
        }

        Ok(())
    }

    /// 下一個訂貨日（不含當天）
    pub fn next_order_day(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.ensure_has_order_days()?;
        let mut current = date;
        loop {
            current = current
                .succ_opt()
                .ok_or_else(|| ProcureError::InvalidPeriod(format!("日期溢出：{}", date)))?;
            if self.is_order_day(current) {
                return Ok(current);
            }
        }
    }

    /// 上一個訂貨日（不含當天）
    pub fn previous_order_day(&self, date: NaiveDate) -> Result<NaiveDate> {
        self.ensure_has_order_days()?;
        let mut current = date;
        loop {
            current = current
                .pred_opt()
                .ok_or_else(|| ProcureError::InvalidPeriod(format!("日期溢出：{}", date)))?;
            if self.is_order_day(current) {
                return Ok(current);
            }
        }
    }

    fn ensure_has_order_days(&self) -> Result<()> {
        if self.order_days.iter().any(|&d| d) {
            Ok(())
        } else {
            Err(ProcureError::InvalidConfig(format!(
                "日曆 {} 沒有任何訂貨日",
                self.calendar_id
            )))
        }
    }
}

impl Default for OrderCycleCalendar {
    fn default() -> Self {
        Self::new("MON-THU".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_order_days() {
        let calendar = OrderCycleCalendar::default();

        assert!(calendar.is_order_day(date(2025, 11, 3))); // 週一
        assert!(!calendar.is_order_day(date(2025, 11, 4))); // 週二
        assert!(calendar.is_order_day(date(2025, 11, 6))); // 週四
        assert!(!calendar.is_order_day(date(2025, 11, 8))); // 週六
    }

    #[test]
    fn test_validate_period() {
        let calendar = OrderCycleCalendar::default();

        assert!(calendar.validate_period(date(2025, 11, 3), date(2025, 11, 6)).is_ok());

        assert!(matches!(
            calendar.validate_period(date(2025, 11, 6), date(2025, 11, 3)),
            Err(ProcureError::InvalidPeriod(_))
        ));
        assert!(matches!(
            calendar.validate_period(date(2025, 11, 3), date(2025, 11, 3)),
            Err(ProcureError::InvalidPeriod(_))
        ));
        assert!(matches!(
            calendar.validate_period(date(2025, 11, 4), date(2025, 11, 6)),
            Err(ProcureError::PeriodNotAligned(_))
        ));
    }

    #[test]
    fn test_holiday_breaks_alignment() {
        let mut calendar = OrderCycleCalendar::default();
        calendar.add_holiday(date(2025, 12, 25)); // 週四

        assert!(!calendar.is_order_day(date(2025, 12, 25)));
        assert_eq!(calendar.next_order_day(date(2025, 12, 22)).unwrap(), date(2025, 12, 29));
    }

    #[test]
    fn test_next_and_previous_order_day() {
        let calendar = OrderCycleCalendar::default();

        assert_eq!(calendar.next_order_day(date(2025, 11, 3)).unwrap(), date(2025, 11, 6));
        assert_eq!(calendar.next_order_day(date(2025, 11, 6)).unwrap(), date(2025, 11, 10));
        assert_eq!(calendar.previous_order_day(date(2025, 11, 6)).unwrap(), date(2025, 11, 3));
    }

    #[test]
    fn test_calendar_without_order_days() {
        let calendar = OrderCycleCalendar::new("NONE".to_string()).with_order_days([false; 7]);
        assert!(matches!(
            calendar.next_order_day(date(2025, 11, 3)),
            Err(ProcureError::InvalidConfig(_))
        ));
    }
}
