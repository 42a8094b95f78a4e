use std::fmt;

/// Canonical marketplace set accepted by the upstream order APIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marketplace {
    OpenSea,
    LooksRare,
    X2Y2,
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized marketplace {0:?} (expected opensea, looksrare, or x2y2)")]
pub struct UnknownMarketplace(pub String);

impl Marketplace {
    pub const ALL: [Marketplace; 3] =
        [Marketplace::OpenSea, Marketplace::LooksRare, Marketplace::X2Y2];

    pub fn as_str(self) -> &'static str {
        match self {
            Marketplace::OpenSea => "OpenSea",
            Marketplace::LooksRare => "LooksRare",
            Marketplace::X2Y2 => "X2Y2",
        }
    }

    /// Maps free-text spellings and order-kind slugs (`seaport`,
    /// `looks-rare`) onto the canonical name. Anything outside the alias
    /// table is an error; there is no fuzzy matching.
    pub fn parse(input: &str) -> Result<Self, UnknownMarketplace> {
        match input.trim().to_ascii_lowercase().as_str() {
            "opensea" | "seaport" => Ok(Marketplace::OpenSea),
            "looksrare" | "looks-rare" => Ok(Marketplace::LooksRare),
            "x2y2" => Ok(Marketplace::X2Y2),
            _ => Err(UnknownMarketplace(input.to_string())),
        }
    }

    /// Taker fee rate applied to a trade's usd price. Venues outside the
    /// canonical set charge an unknown fee and are treated as zero.
    pub fn fee_rate(raw_source: &str) -> f64 {
        match raw_source {
            "OpenSea" => 0.025,
            "LooksRare" => 0.02,
            "X2Y2" => 0.005,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a comma-separated marketplace list into a canonical target set.
pub fn parse_target_set(input: &str) -> Result<Vec<Marketplace>, UnknownMarketplace> {
    let mut out = Vec::new();
    for part in input.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let m = Marketplace::parse(part)?;
        if !out.contains(&m) {
            out.push(m);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_covers_known_spellings() {
        for (alias, want) in [
            ("Opensea", Marketplace::OpenSea),
            ("opensea", Marketplace::OpenSea),
            ("seaport", Marketplace::OpenSea),
            ("Looksrare", Marketplace::LooksRare),
            ("looksrare", Marketplace::LooksRare),
            ("looks-rare", Marketplace::LooksRare),
            ("x2y2", Marketplace::X2Y2),
        ] {
            assert_eq!(Marketplace::parse(alias).unwrap(), want, "{alias}");
        }
    }

    #[test]
    fn unknown_names_fail() {
        assert!(Marketplace::parse("rarible").is_err());
        assert!(Marketplace::parse("").is_err());
    }

    #[test]
    fn target_set_dedups_and_skips_empty_parts() {
        let set = parse_target_set("opensea, x2y2,,OpenSea").unwrap();
        assert_eq!(set, vec![Marketplace::OpenSea, Marketplace::X2Y2]);
    }
}
