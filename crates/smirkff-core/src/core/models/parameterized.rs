use crate::core::forcefield::class::InteractionClass;
use crate::core::forcefield::params::ParameterValues;
use crate::core::forcefield::ruleset::SectionAttributes;
use crate::core::topology::sites::Site;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// The parameters assigned to one interaction site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssignedTerm {
    /// Canonical site the term is stored under.
    pub site: Site,
    /// Atoms in the orientation the winning pattern matched them, in tag order.
    pub atoms: Vec<usize>,
    pub rule_id: String,
    pub smirks: String,
    pub params: ParameterValues,
}

/// All terms of one interaction class, keyed by canonical site.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassTerms {
    class: InteractionClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: SectionAttributes,
    #[serde(serialize_with = "serialize_terms")]
    terms: BTreeMap<Site, AssignedTerm>,
}

fn serialize_terms<S: Serializer>(
    terms: &BTreeMap<Site, AssignedTerm>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(terms.values())
}

impl ClassTerms {
    pub fn new(class: InteractionClass, potential: Option<String>) -> Self {
        Self {
            class,
            potential,
            attributes: SectionAttributes::new(),
            terms: BTreeMap::new(),
        }
    }

    /// Attaches the section-level settings of the class, such as cutoffs or scaling factors.
    pub fn with_attributes(mut self, attributes: SectionAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn class(&self) -> InteractionClass {
        self.class
    }

    pub fn potential(&self) -> Option<&str> {
        self.potential.as_deref()
    }

    pub fn attributes(&self) -> &SectionAttributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&toml::Value> {
        self.attributes.get(name)
    }

    pub(crate) fn insert(&mut self, term: AssignedTerm) {
        self.terms.insert(term.site.clone(), term);
    }

    pub fn get(&self, site: &Site) -> Option<&AssignedTerm> {
        self.terms.get(site)
    }

    /// Terms in canonical site order.
    pub fn iter(&self) -> impl Iterator<Item = &AssignedTerm> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// The result of assigning a force field to one molecule.
///
/// Classes appear in the order they were processed. Serialization is deterministic: the same
/// molecule and rule set always produce the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterizedTopology {
    molecule: String,
    classes: Vec<ClassTerms>,
}

impl ParameterizedTopology {
    pub fn new(molecule: impl Into<String>) -> Self {
        Self {
            molecule: molecule.into(),
            classes: Vec::new(),
        }
    }

    pub fn molecule(&self) -> &str {
        &self.molecule
    }

    pub(crate) fn push_class(&mut self, terms: ClassTerms) {
        self.classes.push(terms);
    }

    pub fn class(&self, class: InteractionClass) -> Option<&ClassTerms> {
        self.classes.iter().find(|c| c.class == class)
    }

    /// Looks up the term of a site given in any orientation.
    pub fn lookup(&self, class: InteractionClass, atoms: &[usize]) -> Option<&AssignedTerm> {
        self.class(class)?.get(&Site::canonical(class, atoms))
    }

    /// Processed classes, in processing order.
    pub fn classes(&self) -> impl Iterator<Item = InteractionClass> + '_ {
        self.classes.iter().map(|c| c.class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassTerms> {
        self.classes.iter()
    }

    /// Total number of assigned terms across all classes.
    pub fn term_count(&self) -> usize {
        self.classes.iter().map(ClassTerms::len).sum()
    }
}
