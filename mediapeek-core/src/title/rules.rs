//! Static keyword tables consumed by the title normalizer.

/// Generic audio terms that never add information to a track title.
pub const COMMON_AUDIO_TERMS: &[&str] = &[
    "Lossless",
    "16-bit",
    "24-bit",
    "32-bit",
    "VBR",
    "CBR",
    "Original Mix",
    "DI",
    "BD",
];

/// Subtitle codec and labelling terms already shown elsewhere.
pub const COMMON_SUBTITLE_TERMS: &[&str] = &[
    "ASS",
    "SSA",
    "PGS",
    "SRT",
    "SUBRIP",
    "VOBSUB",
    "DVD-SUB",
    "DVB-SUB",
    "HDMV PGS",
    "Sub",
    "Subs",
    "Subtitle",
    "Subtitles",
];

/// Track fields whose values are redundant when repeated in a title.
pub const METADATA_FIELDS: &[&str] = &[
    "Format",
    "Format_Info",
    "Format_Commercial",
    "Format_Commercial_IfAny",
    "Format_String",
    "Format_AdditionalFeatures",
    "BitRate_String",
    "SamplingRate_String",
    "Channels_String",
    "ChannelPositions_String2",
    "Channel(s)_String",
    "Channels",
    "CodecID",
    "CodecID_Info",
];

/// Uppercased codec identifiers a rule predicate is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecIdentity {
    pub format: String,
    pub commercial: String,
    pub codec_id: String,
}

impl CodecIdentity {
    pub fn new(format: &str, commercial: &str, codec_id: &str) -> Self {
        Self {
            format: format.to_uppercase(),
            commercial: commercial.to_uppercase(),
            codec_id: codec_id.to_uppercase(),
        }
    }
}

/// Extra tokens to strip when a track's codec matches `applies`.
#[derive(Debug, Clone, Copy)]
pub struct CleaningRule {
    pub name: &'static str,
    pub applies: fn(&CodecIdentity) -> bool,
    pub strip: &'static [&'static str],
}

impl CleaningRule {
    pub fn matches(&self, identity: &CodecIdentity) -> bool {
        (self.applies)(identity)
    }
}

/// Evaluated in order; every matching rule contributes its tokens.
pub const AUDIO_FORMAT_RULES: &[CleaningRule] = &[
    CleaningRule {
        name: "dolby-digital-plus",
        applies: |id| {
            id.format.contains("E-AC-3")
                || id.format.contains("EC-3")
                || id.commercial.contains("DIGITAL PLUS")
        },
        strip: &["DDP", "Dolby Digital Plus", "E-AC-3", "DD+", "DD Plus"],
    },
    CleaningRule {
        name: "truehd",
        applies: |id| {
            id.format.contains("MLP FBA")
                || id.format.contains("TRUEHD")
                || id.commercial.contains("TRUEHD")
        },
        strip: &["TrueHD", "Dolby TrueHD", "Atmos", "Dolby Atmos"],
    },
    CleaningRule {
        name: "dts",
        applies: |id| id.format.contains("DTS") || id.codec_id.contains("DTS"),
        strip: &[
            "DTS-HD MA",
            "DTS-HD Master Audio",
            "DTS-HD",
            "DTS:X",
            "DTS",
            "Master Audio",
            "MA",
            "HRA",
            "ES",
        ],
    },
    CleaningRule {
        name: "ac-3",
        applies: |id| id.format == "AC-3" || id.codec_id == "AC-3",
        strip: &["AC-3", "DD", "Dolby Digital"],
    },
    CleaningRule {
        name: "aac",
        applies: |id| id.format.contains("AAC"),
        strip: &["AAC", "HE-AAC", "LC-AAC"],
    },
    CleaningRule {
        name: "flac",
        applies: |id| id.format.contains("FLAC"),
        strip: &["FLAC"],
    },
];

/// Tokens contributed by every rule matching `identity`.
pub fn rule_tokens(identity: &CodecIdentity) -> impl Iterator<Item = &'static str> + '_ {
    AUDIO_FORMAT_RULES
        .iter()
        .filter(move |rule| rule.matches(identity))
        .flat_map(|rule| rule.strip.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching(identity: &CodecIdentity) -> Vec<&'static str> {
        AUDIO_FORMAT_RULES
            .iter()
            .filter(|rule| rule.matches(identity))
            .map(|rule| rule.name)
            .collect()
    }

    #[test]
    fn test_dts_matches_on_codec_id() {
        let identity = CodecIdentity::new("", "", "A_DTS");
        assert_eq!(matching(&identity), vec!["dts"]);
    }

    #[test]
    fn test_ac3_requires_exact_format() {
        assert_eq!(matching(&CodecIdentity::new("ac-3", "", "")), vec!["ac-3"]);
        assert_eq!(
            matching(&CodecIdentity::new("E-AC-3", "", "")),
            vec!["dolby-digital-plus"]
        );
    }

    #[test]
    fn test_commercial_names_select_one_rule() {
        let identity =
            CodecIdentity::new("E-AC-3 JOC", "Dolby Digital Plus with Dolby Atmos", "");
        assert_eq!(matching(&identity), vec!["dolby-digital-plus"]);

        let identity = CodecIdentity::new("MLP FBA", "Dolby TrueHD with Dolby Atmos", "");
        assert_eq!(matching(&identity), vec!["truehd"]);
        assert!(rule_tokens(&identity).any(|token| token == "Atmos"));
    }
}
