//! Blogging reminder schedules, one row per site.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

pub const DEFAULT_HOUR: i64 = 10;
pub const DEFAULT_MINUTE: i64 = 0;

/// Weekly reminder schedule for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloggingReminders {
    pub local_site_id: i64,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
    pub hour: i64,
    pub minute: i64,
}

impl BloggingReminders {
    /// Schedule with no days enabled at the default time of day.
    pub fn new(local_site_id: i64) -> Self {
        BloggingReminders {
            local_site_id,
            monday: false,
            tuesday: false,
            wednesday: false,
            thursday: false,
            friday: false,
            saturday: false,
            sunday: false,
            hour: DEFAULT_HOUR,
            minute: DEFAULT_MINUTE,
        }
    }

    /// Enable or disable reminders on `day`.
    pub fn set_day(&mut self, day: Weekday, enabled: bool) {
        match day {
            Weekday::Mon => self.monday = enabled,
            Weekday::Tue => self.tuesday = enabled,
            Weekday::Wed => self.wednesday = enabled,
            Weekday::Thu => self.thursday = enabled,
            Weekday::Fri => self.friday = enabled,
            Weekday::Sat => self.saturday = enabled,
            Weekday::Sun => self.sunday = enabled,
        }
    }

    /// Enabled days, Monday first.
    pub fn enabled_days(&self) -> Vec<Weekday> {
        [
            (Weekday::Mon, self.monday),
            (Weekday::Tue, self.tuesday),
            (Weekday::Wed, self.wednesday),
            (Weekday::Thu, self.thursday),
            (Weekday::Fri, self.friday),
            (Weekday::Sat, self.saturday),
            (Weekday::Sun, self.sunday),
        ]
        .into_iter()
        .filter_map(|(day, enabled)| enabled.then_some(day))
        .collect()
    }

    pub fn is_enabled(&self) -> bool {
        !self.enabled_days().is_empty()
    }

    fn from_row(row: &SqliteRow) -> Self {
        BloggingReminders {
            local_site_id: row.get("localSiteId"),
            monday: row.get("monday"),
            tuesday: row.get("tuesday"),
            wednesday: row.get("wednesday"),
            thursday: row.get("thursday"),
            friday: row.get("friday"),
            saturday: row.get("saturday"),
            sunday: row.get("sunday"),
            hour: row.get("hour"),
            minute: row.get("minute"),
        }
    }
}

/// Data-access object for the `BloggingReminders` table.
#[derive(Debug, Clone)]
pub struct BloggingRemindersDao {
    pool: SqlitePool,
}

impl BloggingRemindersDao {
    pub fn new(pool: SqlitePool) -> Self {
        BloggingRemindersDao { pool }
    }

    /// All stored schedules, ordered by site.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_all(&self) -> Result<Vec<BloggingReminders>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT localSiteId, monday, tuesday, wednesday, thursday, friday,
                   saturday, sunday, hour, minute
            FROM BloggingReminders
            ORDER BY localSiteId ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(BloggingReminders::from_row).collect())
    }

    /// Schedules stored for one site; empty when the site has none.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_by_site_id(
        &self,
        site_id: i64,
    ) -> Result<Vec<BloggingReminders>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT localSiteId, monday, tuesday, wednesday, thursday, friday,
                   saturday, sunday, hour, minute
            FROM BloggingReminders
            WHERE localSiteId = ?
            "#,
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(BloggingReminders::from_row).collect())
    }

    /// Store a schedule, replacing any existing one for the same site.
    ///
    /// Returns the row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert(&self, reminders: &BloggingReminders) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT OR REPLACE INTO BloggingReminders (
                localSiteId, monday, tuesday, wednesday, thursday, friday,
                saturday, sunday, hour, minute
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reminders.local_site_id)
        .bind(reminders.monday)
        .bind(reminders.tuesday)
        .bind(reminders.wednesday)
        .bind(reminders.thursday)
        .bind(reminders.friday)
        .bind(reminders.saturday)
        .bind(reminders.sunday)
        .bind(reminders.hour)
        .bind(reminders.minute)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
