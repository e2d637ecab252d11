/// One element of the JSON array returned by restcountries `/v3.1/name/{name}`
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CountryRecord {
    /// Common and official names
    pub name: CountryName,
    /// ISO 3166-1 alpha-3 code, e.g. "NPL"
    #[serde(default)]
    pub cca3: Option<String>,
    /// Flag image URLs
    #[serde(default)]
    pub flags: Option<Flags>,
    /// Offsets in `UTC+HH:MM` notation, first one is the primary zone
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<u64>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CountryName {
    /// Name used for display and for the suggestion list (e.g. "Nepal")
    pub common: String,
    #[serde(default)]
    pub official: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Flags {
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub png: Option<String>,
}

impl CountryRecord {
    /// SVG flag if the service has one, PNG otherwise.
    pub fn flag_url(&self) -> Option<&str> {
        let flags = self.flags.as_ref()?;
        flags
            .svg
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| flags.png.as_deref().filter(|url| !url.is_empty()))
    }

    pub fn primary_timezone(&self) -> Option<&str> {
        self.timezones.first().map(String::as_str)
    }
}
