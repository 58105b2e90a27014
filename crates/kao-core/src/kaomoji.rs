//! Keyword → kaomoji table.

use std::collections::{BTreeMap, HashMap};

/// Built-in keywords, grouped by mood.
const BUILTIN: &[(&str, &str)] = &[
    // Happy
    ("yay", "＼(＾▽＾)／"),
    ("pleased", "(⌒‿⌒)"),
    ("dance", "⌒(o＾▽＾o)ノ"),
    // Love
    ("inlove", "(─‿‿─)♡"),
    // Embarrassed
    ("sorry", "(⌒_⌒;)"),
    // Dissatisfaction
    ("unamused", "(￣︿￣)"),
    ("seriously", "(￢_￢;)"),
    // Angry
    ("thenerve", "(╬ Ò﹏Ó)"),
    ("fliptable", "(╯°□°）╯︵ ┻━┻)"),
    ("fliptable2", "(ﾉಥ益ಥ）ﾉ\u{feff} ┻━┻"),
    ("fliptable3", "(ノಠ益ಠ)ノ彡┻━┻"),
    ("fliptables", "┻━┻ ︵ヽ(`Д´)ﾉ︵\u{feff} ┻━┻"),
    // Serene
    ("unfliptable", "┬─┬ノ( º _ ºノ)"),
    // Sad
    ("sad", "(╯︵╰,)"),
    // Fear
    ("coldsweat", "(;;;*_*)"),
    ("cantlook", "(/ω＼)"),
    // Indifference
    ("shrug", r"¯\_(ツ)_/¯"),
    // Doubting
    ("doubt", "(￢_￢)"),
    // Surprise
    ("what", "(⊙_⊙)"),
    // Greetings
    ("hi", "(￣▽￣)ノ"),
    ("sup", "(・_・)ノ"),
    // Sleeping
    ("zzz", "(－_－) zzZ"),
    // Music
    ("sing", "(￣▽￣)/♫•*¨*•.¸¸♪"),
];

/// Immutable keyword → glyph mapping, built once at startup.
///
/// Keywords are stored lower-cased; lookups are case-insensitive.
#[derive(Clone, Debug)]
pub struct KaomojiTable {
    entries: HashMap<String, String>,
}

impl Default for KaomojiTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KaomojiTable {
    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.entries
            .get(&keyword.to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON dump of the table, sorted by keyword (used by the help text).
    pub fn to_pretty_json(&self) -> String {
        let sorted: BTreeMap<&str, &str> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        serde_json::to_string_pretty(&sorted).expect("string map serializes")
    }
}
