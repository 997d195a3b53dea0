//! Fixed label tables: NER label → ontology classes, literal label → datatype

use semtab_core::{Label, LabelSet};

pub const DBPEDIA_ONTOLOGY: &str = "http://dbpedia.org/ontology/";
pub const XML_SCHEMA: &str = "http://www.w3.org/2001/XMLSchema#";

/// Ontology classes (local names) acceptable for a named-entity label.
///
/// Literal and unknown labels map to nothing.
pub fn ner_class_names(label: &Label) -> &'static [&'static str] {
    match label {
        Label::Person => &["Person"],
        Label::Norp => &["EthnicGroup", "PoliticalParty"],
        Label::Facility => &["Building", "ArchitecturalStructure", "Infrastructure"],
        Label::Org => &["Organisation"],
        Label::Gpe => &["Country", "City", "PopulatedPlace"],
        Label::Loc => &["Place", "NaturalPlace"],
        Label::Product => &["Device", "Software", "MeanOfTransportation"],
        Label::Event => &["Event"],
        Label::WorkOfArt => &["Work", "Artwork"],
        Label::Law => &["Law", "LegalCase"],
        Label::Language => &["Language"],
        _ => &[],
    }
}

/// Full class URIs for every named-entity label of a cell, deduplicated
pub fn ner_classes(labels: &LabelSet) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for label in labels.iter() {
        for name in ner_class_names(label) {
            let uri = format!("{}{}", DBPEDIA_ONTOLOGY, name);
            if !classes.contains(&uri) {
                classes.push(uri);
            }
        }
    }
    classes
}

/// XML Schema local name for a label; anything unmapped is `string`
pub fn datatype_name(label: &Label) -> &'static str {
    match label {
        Label::Cardinal | Label::Ordinal => "integer",
        Label::Money | Label::Quantity => "decimal",
        Label::Percent => "double",
        Label::Date => "date",
        Label::Time => "time",
        Label::Url => "anyURI",
        Label::Boolean => "boolean",
        _ => "string",
    }
}

pub fn datatype_uri(label: &Label) -> String {
    format!("{}{}", XML_SCHEMA, datatype_name(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpe_maps_to_several_classes() {
        let classes = ner_classes(&LabelSet::single(Label::Gpe));
        assert_eq!(
            classes,
            vec![
                "http://dbpedia.org/ontology/Country",
                "http://dbpedia.org/ontology/City",
                "http://dbpedia.org/ontology/PopulatedPlace",
            ]
        );
    }

    #[test]
    fn test_literals_have_no_classes() {
        assert!(ner_classes(&LabelSet::single(Label::Cardinal)).is_empty());
        assert!(ner_class_names(&Label::Other("MISC".into())).is_empty());
    }

    #[test]
    fn test_mixed_set_deduplicates() {
        let labels: LabelSet = [Label::Gpe, Label::Loc, Label::Date].into_iter().collect();
        let classes = ner_classes(&labels);
        assert_eq!(classes.len(), 5);
    }

    #[test]
    fn test_datatypes() {
        assert_eq!(datatype_uri(&Label::Cardinal), "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(datatype_name(&Label::Email), "string");
        assert_eq!(datatype_name(&Label::Other("X".into())), "string");
    }
}
