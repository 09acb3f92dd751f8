use crate::components::shard::RouteSource;
use crate::components::wrappers::CarrierCode;
use crate::{DataError, LoadCsv};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Where placeholder citations point until someone verifies the route.
pub const PLACEHOLDER_URL: &str = "https://example.com/verify-required";

/// Official timetables of the carriers the dataset tracks.
const BUILTIN_SOURCES: [(&str, &str, &str); 13] = [
    ("NH", "ANA公式時刻表", "https://www.ana.co.jp/ja/jp/book-plan/flight-schedule/"),
    ("JL", "JAL公式時刻表", "https://www.jal.co.jp/jp/ja/jmb/flightschedule/"),
    ("BC", "スカイマーク公式時刻表", "https://www.skymark.co.jp/ja/timetable/"),
    ("GK", "ジェットスター・ジャパン公式時刻表", "https://www.jetstar.com/jp/ja/flight-schedules"),
    ("MM", "ピーチ・アビエーション公式時刻表", "https://www.flypeach.com/jp/ja/schedule"),
    ("6J", "ソラシドエア公式時刻表", "https://www.solaseedair.jp/timetable/"),
    ("NU", "JTA公式時刻表", "https://www.jta.co.jp/schedule/"),
    ("RC", "JAC公式時刻表", "https://www.jac.co.jp/schedule/"),
    ("OC", "RAC公式時刻表", "https://www.rac.co.jp/schedule/"),
    ("UA", "ユナイテッド航空公式時刻表", "https://www.united.com/ja/jp/fly/schedules"),
    ("SQ", "シンガポール航空公式時刻表", "https://www.singaporeair.com/ja_JP/jp/plan-travel/timetables/"),
    ("KE", "大韓航空公式時刻表", "https://www.koreanair.com/jp/ja/schedule/"),
    ("7G", "スターフライヤー公式時刻表", "https://www.starflyer.jp/timetable/"),
];

/// A row of `carrier_sources.csv`:
/// ```csv
/// carrier;title;url
/// IJ;Spring Japan timetable;https://jp.ch.com/timetable
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CarrierSourceRow {
    /// The carrier the timetable belongs to
    pub carrier: CarrierCode,
    /// The citation title
    pub title: String,
    /// The citation url
    pub url: String,
}

/// Carrier to official timetable lookup with a fallback for unknown carriers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierSourceTable {
    /// Known timetables by carrier
    pub sources: BTreeMap<CarrierCode, RouteSource>,
    /// Url used for carriers without a known timetable
    pub fallback_url: String,
}

impl Default for CarrierSourceTable {
    #[inline]
    fn default() -> Self {
        let mut table = Self::empty();
        for (carrier, title, url) in BUILTIN_SOURCES {
            table.insert(CarrierCode::from(carrier), title, url);
        }
        table
    }
}

impl CarrierSourceTable {
    /// A table that knows no carrier.
    #[must_use]
    #[inline]
    pub fn empty() -> Self {
        Self {
            sources: BTreeMap::new(),
            fallback_url: PLACEHOLDER_URL.to_owned(),
        }
    }

    /// The built-in table, extended by `path` when that file exists.
    /// # Errors
    /// If the file exists but is not a valid table.
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let mut table = Self::default();
        if path.exists() {
            let added = table.extend_from_csv(path)?;
            info!("Loaded {added} carrier sources from {}", path.display());
        } else {
            debug!("{} not found, using built-in carrier sources", path.display());
        }
        Ok(table)
    }

    /// Adds or replaces entries from a `carrier;title;url` table with a header row.
    /// # Errors
    /// If the file cannot be read or a row is malformed.
    #[inline]
    pub fn extend_from_csv(&mut self, path: &Path) -> Result<usize, DataError> {
        let rows = CarrierSourceRow::load_csv(path, true)?;
        let count = rows.len();
        for row in rows {
            self.insert(row.carrier, &row.title, &row.url);
        }
        Ok(count)
    }

    /// Adds or replaces the timetable of `carrier`.
    #[inline]
    pub fn insert(&mut self, carrier: CarrierCode, title: &str, url: &str) {
        self.sources.insert(
            carrier,
            RouteSource {
                title: title.to_owned(),
                url: url.to_owned(),
            },
        );
    }

    /// The citation to attach to an unverified route of `carrier`.
    #[must_use]
    #[inline]
    pub fn source_for(&self, carrier: &CarrierCode) -> RouteSource {
        self.sources
            .get(carrier)
            .cloned()
            .unwrap_or_else(|| self.placeholder(carrier))
    }

    /// Whether `carrier` has a known timetable.
    #[must_use]
    #[inline]
    pub fn knows(&self, carrier: &CarrierCode) -> bool {
        self.sources.contains_key(carrier)
    }

    /// The "requires verification" citation for `carrier`.
    #[must_use]
    #[inline]
    pub fn placeholder(&self, carrier: &CarrierCode) -> RouteSource {
        RouteSource {
            title: format!("{carrier}公式時刻表（要確認）"),
            url: self.fallback_url.clone(),
        }
    }
}
