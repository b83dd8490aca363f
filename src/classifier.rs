use std::collections::BTreeMap;

use crate::model::Section;

/// Trigger substrings in priority order; the first match on a line wins.
pub(crate) const TRIGGERS: [(&str, Section); 4] = [
    ("NO. DE SERVICIO", Section::GeneralInfo),
    ("Costos de la energía", Section::EnergyCosts),
    ("CONSUMO HISTÓRICO", Section::HistoricalConsumption),
    ("Período", Section::PaymentHistory),
];

#[must_use]
pub fn trigger_for(line: &str) -> Option<Section> {
    TRIGGERS
        .iter()
        .find(|(trigger, _)| line.contains(trigger))
        .map(|(_, section)| *section)
}

/// Raw lines grouped by the section that was active when they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedSections {
    buckets: BTreeMap<Section, Vec<String>>,
}

impl ClassifiedSections {
    #[must_use]
    pub fn lines(&self, section: Section) -> &[String] {
        self.buckets.get(&section).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    fn push(&mut self, section: Section, line: &str) {
        self.buckets
            .entry(section)
            .or_default()
            .push(line.to_string());
    }
}

/// Classifier state machine. `current == None` drops lines until a trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifierState {
    pub current: Option<Section>,
    pub sections: ClassifiedSections,
}

impl ClassifierState {
    #[must_use]
    pub fn step(mut self, line: &str) -> Self {
        if let Some(section) = trigger_for(line) {
            self.current = Some(section);
        }
        if let Some(section) = self.current {
            self.sections.push(section, line);
        }
        self
    }
}

/// Folds the state machine over `lines` in document order.
pub fn classify_lines<'a, I>(lines: I) -> ClassifiedSections
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .fold(ClassifierState::default(), ClassifierState::step)
        .sections
}
