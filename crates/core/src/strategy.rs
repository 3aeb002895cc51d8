//! Editorial guidance appended to the unmapped report.

pub const MAPPING_STRATEGY: &[(&str, &str)] = &[
    ("Occasion tags", "Map to Session Structure folders"),
    ("SFX keywords", "Map to SFX & Foley folders"),
    ("Location keywords", "Map to Environment folders"),
    ("Creature keywords", "Map to SFX & Foley/Creature Sounds"),
    ("Mood tags", "Map to Moods & Atmosphere folders"),
    ("Genre tags", "Map to appropriate Cultural Styles folders"),
];
