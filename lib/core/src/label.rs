//! Cell labels produced by the NER collaborator
//!
//! A cell carries a [`LabelSet`]; the scalar case is a singleton set so the
//! column classifier counts both shapes the same way.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A named-entity or literal type assigned to a text span
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    // Named entities
    Person,
    Norp,
    Facility,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    // Literals
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
    Email,
    Url,
    Phone,
    Boolean,
    /// Cell with no content
    Empty,
    /// Any label outside the known vocabulary
    Other(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Person => "PERSON",
            Label::Norp => "NORP",
            Label::Facility => "FAC",
            Label::Org => "ORG",
            Label::Gpe => "GPE",
            Label::Loc => "LOC",
            Label::Product => "PRODUCT",
            Label::Event => "EVENT",
            Label::WorkOfArt => "WORK_OF_ART",
            Label::Law => "LAW",
            Label::Language => "LANGUAGE",
            Label::Date => "DATE",
            Label::Time => "TIME",
            Label::Percent => "PERCENT",
            Label::Money => "MONEY",
            Label::Quantity => "QUANTITY",
            Label::Ordinal => "ORDINAL",
            Label::Cardinal => "CARDINAL",
            Label::Email => "EMAIL",
            Label::Url => "URL",
            Label::Phone => "PHONE",
            Label::Boolean => "BOOLEAN",
            Label::Empty => "EMPTY",
            Label::Other(name) => name,
        }
    }

    /// Whether the label belongs to the named-entity set
    pub fn is_named_entity(&self) -> bool {
        matches!(
            self,
            Label::Person
                | Label::Norp
                | Label::Facility
                | Label::Org
                | Label::Gpe
                | Label::Loc
                | Label::Product
                | Label::Event
                | Label::WorkOfArt
                | Label::Law
                | Label::Language
        )
    }

    /// Whether the label belongs to the literal set
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Label::Date
                | Label::Time
                | Label::Percent
                | Label::Money
                | Label::Quantity
                | Label::Ordinal
                | Label::Cardinal
                | Label::Email
                | Label::Url
                | Label::Phone
                | Label::Boolean
        )
    }
}

impl FromStr for Label {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "PERSON" | "PER" => Label::Person,
            "NORP" => Label::Norp,
            "FAC" | "FACILITY" => Label::Facility,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Label::Org,
            "GPE" => Label::Gpe,
            "LOC" | "LOCATION" => Label::Loc,
            "PRODUCT" => Label::Product,
            "EVENT" => Label::Event,
            "WORK_OF_ART" => Label::WorkOfArt,
            "LAW" => Label::Law,
            "LANGUAGE" => Label::Language,
            "DATE" => Label::Date,
            "TIME" => Label::Time,
            "PERCENT" => Label::Percent,
            "MONEY" => Label::Money,
            "QUANTITY" => Label::Quantity,
            "ORDINAL" => Label::Ordinal,
            "CARDINAL" => Label::Cardinal,
            "EMAIL" => Label::Email,
            "URL" => Label::Url,
            "PHONE" => Label::Phone,
            "BOOLEAN" | "BOOL" => Label::Boolean,
            "EMPTY" => Label::Empty,
            _ => Label::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(label) => label,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::from(s.to_string())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated set of labels in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "LabelSetRepr", into = "Vec<Label>")]
pub struct LabelSet(SmallVec<[Label; 2]>);

/// Accepts both `"GPE"` and `["GPE", "ORG"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelSetRepr {
    One(Label),
    Many(Vec<Label>),
}

impl From<LabelSetRepr> for LabelSet {
    fn from(repr: LabelSetRepr) -> Self {
        match repr {
            LabelSetRepr::One(label) => LabelSet::single(label),
            LabelSetRepr::Many(labels) => labels.into_iter().collect(),
        }
    }
}

impl From<LabelSet> for Vec<Label> {
    fn from(set: LabelSet) -> Self {
        set.0.into_vec()
    }
}

impl LabelSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    #[inline]
    #[must_use]
    pub fn single(label: Label) -> Self {
        let mut set = Self::new();
        set.insert(label);
        set
    }

    /// Insert a label, ignoring duplicates. Returns true if it was new.
    pub fn insert(&mut self, label: Label) -> bool {
        if self.0.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.0.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First label in insertion order
    pub fn primary(&self) -> Option<&Label> {
        self.0.first()
    }

    pub fn has_named_entity(&self) -> bool {
        self.0.iter().any(Label::is_named_entity)
    }

    pub fn has_literal(&self) -> bool {
        self.0.iter().any(Label::is_literal)
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

impl From<Label> for LabelSet {
    fn from(label: Label) -> Self {
        LabelSet::single(label)
    }
}
