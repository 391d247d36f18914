//! Address → district → macro-region classification
//!
//! Seoul's autonomous districts (구) are grouped into five macro-regions (권역)
//! that the air-quality service uses as its coarse query key. The table is
//! fixed and compiled in.

use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static DISTRICT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣]{2,}구)\b").expect("district pattern is valid"));

static DISTRICT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[가-힣]{2,}구$").expect("district token pattern is valid"));

/// Macro-region (권역)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Downtown,
    Northeast,
    Northwest,
    Southwest,
    Southeast,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Downtown,
        Region::Northeast,
        Region::Northwest,
        Region::Southwest,
        Region::Southeast,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Region::Downtown => "도심권",
            Region::Northeast => "동북권",
            Region::Northwest => "서북권",
            Region::Southwest => "서남권",
            Region::Southeast => "동남권",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Autonomous district (구) covered by the region table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum District {
    Yongsan,
    Eunpyeong,
    Seodaemun,
    Mapo,
    Gwangjin,
    Seongdong,
    Jungnang,
    Dongdaemun,
    Seongbuk,
    Dobong,
    Gangbuk,
    Nowon,
    Gangseo,
    Guro,
    Yeongdeungpo,
    Dongjak,
    Gwanak,
    Geumcheon,
    Yangcheon,
    Gangnam,
    Seocho,
    Songpa,
    Gangdong,
}

impl District {
    pub const ALL: [District; 23] = [
        District::Yongsan,
        District::Eunpyeong,
        District::Seodaemun,
        District::Mapo,
        District::Gwangjin,
        District::Seongdong,
        District::Jungnang,
        District::Dongdaemun,
        District::Seongbuk,
        District::Dobong,
        District::Gangbuk,
        District::Nowon,
        District::Gangseo,
        District::Guro,
        District::Yeongdeungpo,
        District::Dongjak,
        District::Gwanak,
        District::Geumcheon,
        District::Yangcheon,
        District::Gangnam,
        District::Seocho,
        District::Songpa,
        District::Gangdong,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            District::Yongsan => "용산구",
            District::Eunpyeong => "은평구",
            District::Seodaemun => "서대문구",
            District::Mapo => "마포구",
            District::Gwangjin => "광진구",
            District::Seongdong => "성동구",
            District::Jungnang => "중랑구",
            District::Dongdaemun => "동대문구",
            District::Seongbuk => "성북구",
            District::Dobong => "도봉구",
            District::Gangbuk => "강북구",
            District::Nowon => "노원구",
            District::Gangseo => "강서구",
            District::Guro => "구로구",
            District::Yeongdeungpo => "영등포구",
            District::Dongjak => "동작구",
            District::Gwanak => "관악구",
            District::Geumcheon => "금천구",
            District::Yangcheon => "양천구",
            District::Gangnam => "강남구",
            District::Seocho => "서초구",
            District::Songpa => "송파구",
            District::Gangdong => "강동구",
        }
    }

    #[must_use]
    pub fn region(self) -> Region {
        match self {
            District::Yongsan => Region::Downtown,
            District::Eunpyeong | District::Seodaemun | District::Mapo => Region::Northwest,
            District::Gwangjin
            | District::Seongdong
            | District::Jungnang
            | District::Dongdaemun
            | District::Seongbuk
            | District::Dobong
            | District::Gangbuk
            | District::Nowon => Region::Northeast,
            District::Gangseo
            | District::Guro
            | District::Yeongdeungpo
            | District::Dongjak
            | District::Gwanak
            | District::Geumcheon
            | District::Yangcheon => Region::Southwest,
            District::Gangnam | District::Seocho | District::Songpa | District::Gangdong => {
                Region::Southeast
            }
        }
    }

    /// Exact lookup by Korean name; no fuzzy or partial matching
    #[must_use]
    pub fn from_name(name: &str) -> Option<District> {
        District::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// District and region of an address.
///
/// Serializes as `{"region": "...", "district": "..."}`, with empty strings
/// when the address did not name a known district.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegionClassification {
    pub district: Option<District>,
}

impl RegionClassification {
    #[must_use]
    pub fn of(district: District) -> Self {
        Self {
            district: Some(district),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.district.is_none()
    }

    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.district.map(District::region)
    }

    /// Region name or "" when unmapped
    #[must_use]
    pub fn region_name(&self) -> &'static str {
        self.region().map_or("", Region::name)
    }

    /// District name or "" when unmapped
    #[must_use]
    pub fn district_name(&self) -> &'static str {
        self.district.map_or("", District::name)
    }
}

impl Serialize for RegionClassification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegionClassification", 2)?;
        state.serialize_field("region", self.region_name())?;
        state.serialize_field("district", self.district_name())?;
        state.end()
    }
}

/// Pull the first district-like token ("광진구") out of a free-text address.
///
/// Returns an empty string when the address holds no such token.
#[must_use]
pub fn extract_district(address: &str) -> String {
    let normalized = address.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return String::new();
    }

    let mut matches = DISTRICT_PATTERN.find_iter(&normalized).map(|m| m.as_str());
    if let Some(first) = matches.next() {
        let others: Vec<&str> = matches.filter(|m| *m != first).collect();
        if !others.is_empty() {
            debug!(
                address = %normalized,
                chosen = first,
                ignored = ?others,
                "address names several districts, using the first"
            );
        }
        return first.to_string();
    }

    normalized
        .split(' ')
        .find(|token| DISTRICT_TOKEN.is_match(token))
        .map(str::to_string)
        .unwrap_or_default()
}

/// Classify a free-text address into its district and macro-region.
///
/// Total and deterministic. Tokens that look like a district but are not one
/// of the 23 table entries produce the empty classification.
#[must_use]
pub fn map_address_to_region(address: &str) -> RegionClassification {
    let token = extract_district(address);
    if token.is_empty() {
        return RegionClassification::default();
    }

    match District::from_name(&token) {
        Some(district) => RegionClassification::of(district),
        None => {
            debug!(token = %token, "district not in region table");
            RegionClassification::default()
        }
    }
}
