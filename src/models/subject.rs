use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A celestial body that can appear on a chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    Lilith,
    NorthNode,
}

impl Planet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Uranus => "Uranus",
            Self::Neptune => "Neptune",
            Self::Pluto => "Pluto",
            Self::Chiron => "Chiron",
            Self::Lilith => "Lilith",
            Self::NorthNode => "North Node",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Sun => "☉",
            Self::Moon => "☽",
            Self::Mercury => "☿",
            Self::Venus => "♀",
            Self::Mars => "♂",
            Self::Jupiter => "♃",
            Self::Saturn => "♄",
            Self::Uranus => "♅",
            Self::Neptune => "♆",
            Self::Pluto => "♇",
            Self::Chiron => "⚷",
            Self::Lilith => "⚸",
            Self::NorthNode => "☊",
        }
    }

    /// Sun through Pluto, the bodies the combined chart compares.
    pub fn is_classical(&self) -> bool {
        !matches!(self, Self::Chiron | Self::Lilith | Self::NorthNode)
    }

    /// Map a body name as reported by the upstream calculation API.
    ///
    /// `Mean_Node` is taken as the North Node. `True_Node` is skipped so a
    /// chart never carries two north nodes.
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name {
            "Sun" => Some(Self::Sun),
            "Moon" => Some(Self::Moon),
            "Mercury" => Some(Self::Mercury),
            "Venus" => Some(Self::Venus),
            "Mars" => Some(Self::Mars),
            "Jupiter" => Some(Self::Jupiter),
            "Saturn" => Some(Self::Saturn),
            "Uranus" => Some(Self::Uranus),
            "Neptune" => Some(Self::Neptune),
            "Pluto" => Some(Self::Pluto),
            "Chiron" => Some(Self::Chiron),
            "Lilith" => Some(Self::Lilith),
            "Mean_Node" => Some(Self::NorthNode),
            _ => None,
        }
    }
}

/// One of the twelve 30° zodiac signs, starting at 0° Aries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    /// The sign containing an ecliptic longitude. Values outside [0, 360) wrap.
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = longitude.rem_euclid(360.0);
        let index = ((normalized / 30.0) as usize).min(11);
        Self::ALL[index]
    }

    /// Three-letter abbreviation used by the upstream API.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Aries => "Ari",
            Self::Taurus => "Tau",
            Self::Gemini => "Gem",
            Self::Cancer => "Can",
            Self::Leo => "Leo",
            Self::Virgo => "Vir",
            Self::Libra => "Lib",
            Self::Scorpio => "Sco",
            Self::Sagittarius => "Sag",
            Self::Capricorn => "Cap",
            Self::Aquarius => "Aqu",
            Self::Pisces => "Pis",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Aries => "♈",
            Self::Taurus => "♉",
            Self::Gemini => "♊",
            Self::Cancer => "♋",
            Self::Leo => "♌",
            Self::Virgo => "♍",
            Self::Libra => "♎",
            Self::Scorpio => "♏",
            Self::Sagittarius => "♐",
            Self::Capricorn => "♑",
            Self::Aquarius => "♒",
            Self::Pisces => "♓",
        }
    }
}

/// House division convention forwarded to the calculation API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Placidus,
    Koch,
    Regiomontanus,
    Campanus,
    Equal,
    WholeSign,
}

/// A birth or reference moment and place, as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BirthData {
    /// Name of the person or event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub year: i32,
    /// Month (1-12)
    pub month: u32,
    /// Day of month (1-31)
    pub day: u32,
    /// Hour (0-23)
    pub hour: u32,
    /// Minute (0-59)
    pub minute: u32,
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
    /// IANA time zone, e.g. "America/Sao_Paulo"
    pub tz_str: String,
    #[serde(default)]
    pub house_system: HouseSystem,
}

impl BirthData {
    /// The local date and time, if it names a real calendar moment.
    pub fn moment(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// The subject name, falling back to `default_name` when unset or blank.
    pub fn display_name<'a>(&'a self, default_name: &'a str) -> &'a str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(default_name)
    }

    /// Check the fields the calculation API cannot be trusted to reject cleanly.
    pub fn validate(&self) -> Result<(), String> {
        if self.moment().is_none() {
            return Err(format!(
                "Invalid date/time {:04}-{:02}-{:02} {:02}:{:02}",
                self.year, self.month, self.day, self.hour, self.minute
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("Latitude {} out of range [-90, 90]", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!(
                "Longitude {} out of range [-180, 180]",
                self.longitude
            ));
        }
        if self.tz_str.trim().is_empty() {
            return Err("tz_str must not be empty".to_string());
        }
        Ok(())
    }
}

/// A planet placed on the ecliptic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PlanetPosition {
    pub planet: Planet,
    /// Ecliptic longitude in degrees, [0, 360)
    pub longitude: f64,
    pub sign: ZodiacSign,
}

impl PlanetPosition {
    /// Place a planet, deriving its sign. A longitude of exactly 360 wraps to 0.
    pub fn new(planet: Planet, longitude: f64) -> Self {
        let longitude = if longitude == 360.0 { 0.0 } else { longitude };
        Self {
            planet,
            longitude,
            sign: ZodiacSign::from_longitude(longitude),
        }
    }
}

/// A resolved chart: a named moment and place with its planetary positions.
///
/// Built once by a chart provider (or read from JSON) and only borrowed
/// afterwards; nothing in the crate mutates a subject once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ChartSubject {
    pub name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub planets: Vec<PlanetPosition>,
}

impl ChartSubject {
    /// Attach resolved positions to the moment and place they were computed for.
    pub fn from_birth_data(
        data: &BirthData,
        default_name: &str,
        planets: Vec<PlanetPosition>,
    ) -> Self {
        Self {
            name: data.display_name(default_name).to_string(),
            year: data.year,
            month: data.month,
            day: data.day,
            hour: data.hour,
            minute: data.minute,
            latitude: data.latitude,
            longitude: data.longitude,
            planets,
        }
    }

    pub fn position(&self, planet: Planet) -> Option<&PlanetPosition> {
        self.planets.iter().find(|p| p.planet == planet)
    }
}
