//! Options pane: rank, sequence, hybrid and boolean filters.

use specimen_lib::model::TaxonSelection;
use specimen_lib::query::{HybridFilter, Primers, QueryOptions, QueryState, SequenceType};

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Rank,
    SequenceType,
    ForwardPrimer,
    ReversePrimer,
    Hybrids,
    ExcludeDuplicates,
    ExcludeMisclassified,
    CheckedLocationsOnly,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Self::Rank,
        Self::SequenceType,
        Self::ForwardPrimer,
        Self::ReversePrimer,
        Self::Hybrids,
        Self::ExcludeDuplicates,
        Self::ExcludeMisclassified,
        Self::CheckedLocationsOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Rank => "Identification rank",
            Self::SequenceType => "Sequences",
            Self::ForwardPrimer => "Forward primer",
            Self::ReversePrimer => "Reverse primer",
            Self::Hybrids => "Hybrids",
            Self::ExcludeDuplicates => "Exclude duplicates",
            Self::ExcludeMisclassified => "Exclude misclassified",
            Self::CheckedLocationsOnly => "Checked locations only",
        }
    }

    fn is_primer(self) -> bool {
        matches!(self, Self::ForwardPrimer | Self::ReversePrimer)
    }
}

/// A rendered form row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub field: Field,
    pub value: String,
    pub enabled: bool,
    pub focused: bool,
}

#[derive(Debug, Default)]
pub struct OptionsForm {
    focus: usize,
    /// Ranks offered by the taxonomy, first-seen order.
    ranks: Vec<String>,
    /// Index into `ranks`; `None` means any rank.
    rank: Option<usize>,
    sequence: SequenceType,
    primers: Primers,
    options: QueryOptions,
}

impl OptionsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rank choices, resetting the current choice.
    pub fn set_ranks(&mut self, ranks: Vec<String>) {
        self.ranks = ranks;
        self.rank = None;
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focus]
    }

    /// Primer inputs only take part in primer mode.
    pub fn is_enabled(&self, field: Field) -> bool {
        !field.is_primer() || self.sequence == SequenceType::Primers
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(Field::ALL.len() - 1);
    }

    fn move_focus(&mut self, step: usize) {
        let len = Field::ALL.len();
        for _ in 0..len {
            self.focus = (self.focus + step) % len;
            if self.is_enabled(self.focused()) {
                return;
            }
        }
    }

    /// Space: flips booleans and cycles choices forward.
    pub fn activate(&mut self) {
        match self.focused() {
            Field::ExcludeDuplicates => flip(&mut self.options.exclude_duplicates),
            Field::ExcludeMisclassified => flip(&mut self.options.exclude_misclassified),
            Field::CheckedLocationsOnly => flip(&mut self.options.checked_locations_only),
            Field::ForwardPrimer | Field::ReversePrimer => {}
            _ => self.cycle(true),
        }
    }

    /// Left/Right on a choice field.
    pub fn cycle(&mut self, forward: bool) {
        match self.focused() {
            Field::Rank => {
                let slots = self.ranks.len() + 1;
                let current = self.rank.map_or(0, |i| i + 1);
                let next = if forward {
                    (current + 1) % slots
                } else {
                    (current + slots - 1) % slots
                };
                self.rank = next.checked_sub(1);
            }
            Field::SequenceType => {
                self.sequence = match self.sequence {
                    SequenceType::Full => SequenceType::Primers,
                    SequenceType::Primers => SequenceType::Full,
                };
            }
            Field::Hybrids => {
                self.options.hybrids = if forward {
                    self.options.hybrids.next()
                } else {
                    self.options.hybrids.prev()
                };
            }
            _ => {}
        }
    }

    /// Typing into the focused primer field. Returns `false` if the focused
    /// field does not take text.
    pub fn type_char(&mut self, c: char) -> bool {
        match self.primer_mut() {
            Some(primer) => {
                primer.push(c.to_ascii_uppercase());
                true
            }
            None => false,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(primer) = self.primer_mut() {
            primer.pop();
        }
    }

    fn primer_mut(&mut self) -> Option<&mut String> {
        if !self.is_enabled(self.focused()) {
            return None;
        }
        match self.focused() {
            Field::ForwardPrimer => Some(&mut self.primers.forward),
            Field::ReversePrimer => Some(&mut self.primers.reverse),
            _ => None,
        }
    }

    pub fn rows(&self) -> Vec<FieldRow> {
        Field::ALL
            .iter()
            .enumerate()
            .map(|(index, field)| FieldRow {
                field: *field,
                value: self.value(*field),
                enabled: self.is_enabled(*field),
                focused: index == self.focus,
            })
            .collect()
    }

    fn value(&self, field: Field) -> String {
        let check = |b: bool| (if b { "[x]" } else { "[ ]" }).to_string();
        match field {
            Field::Rank => self
                .rank
                .and_then(|i| self.ranks.get(i))
                .cloned()
                .unwrap_or_else(|| "any".to_string()),
            Field::SequenceType => match self.sequence {
                SequenceType::Full => "full".to_string(),
                SequenceType::Primers => "primers".to_string(),
            },
            Field::ForwardPrimer => self.primers.forward.clone(),
            Field::ReversePrimer => self.primers.reverse.clone(),
            Field::Hybrids => HybridFilter::ALL
                .iter()
                .map(|h| {
                    if *h == self.options.hybrids {
                        format!("<{}>", h.label())
                    } else {
                        h.label().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            Field::ExcludeDuplicates => check(self.options.exclude_duplicates),
            Field::ExcludeMisclassified => check(self.options.exclude_misclassified),
            Field::CheckedLocationsOnly => check(self.options.checked_locations_only),
        }
    }

    /// Assembles the request body around the taxonomy selection.
    pub fn query_state(&self, taxonomy: Vec<TaxonSelection>) -> QueryState {
        let mut state = QueryState::new()
            .with_taxonomy(taxonomy)
            .with_sequence(self.sequence, self.primers.clone())
            .with_options(self.options.clone());
        if let Some(rank) = self.rank.and_then(|i| self.ranks.get(i)) {
            state = state.with_identification_rank(rank.clone());
        }
        state
    }
}

fn flip(value: &mut bool) {
    *value = !*value;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(form: &mut OptionsForm, field: Field) {
        while form.focused() != field {
            form.focus_next();
        }
    }

    #[test]
    fn test_primer_fields_skipped_until_primer_mode() {
        let mut form = OptionsForm::new();
        form.focus_next();
        assert_eq!(form.focused(), Field::SequenceType);
        form.focus_next();
        assert_eq!(form.focused(), Field::Hybrids);

        form.focus_prev();
        form.activate();
        form.focus_next();
        assert_eq!(form.focused(), Field::ForwardPrimer);
        for c in "ggtc".chars() {
            assert!(form.type_char(c));
        }
        form.backspace();

        let state = form.query_state(Vec::new());
        assert_eq!(state.sequence.kind, Some(SequenceType::Primers));
        assert_eq!(state.sequence.primers.map(|p| p.forward), Some("GGT".to_string()));
    }

    #[test]
    fn test_primers_not_sent_in_full_mode() {
        let mut form = OptionsForm::new();
        focus(&mut form, Field::SequenceType);
        form.activate();
        form.focus_next();
        form.type_char('a');
        form.focus_prev();
        form.activate();

        let state = form.query_state(Vec::new());
        assert_eq!(state.sequence.kind, Some(SequenceType::Full));
        assert_eq!(state.sequence.primers, None);
    }

    #[test]
    fn test_rank_cycles_through_any() {
        let mut form = OptionsForm::new();
        form.set_ranks(vec!["kingdom".into(), "genus".into()]);

        form.cycle(true);
        assert_eq!(form.query_state(Vec::new()).identification_rank.as_deref(), Some("kingdom"));
        form.cycle(true);
        form.cycle(true);
        assert_eq!(form.query_state(Vec::new()).identification_rank, None);
        form.cycle(false);
        assert_eq!(form.rows()[0].value, "genus");
    }

    #[test]
    fn test_booleans_and_hybrids() {
        let mut form = OptionsForm::new();
        focus(&mut form, Field::Hybrids);
        form.cycle(false);
        focus(&mut form, Field::ExcludeMisclassified);
        form.activate();
        assert!(!form.type_char('x'));

        let state = form.query_state(Vec::new());
        assert_eq!(state.options.hybrids, HybridFilter::Only);
        assert!(state.options.exclude_misclassified);
        assert!(!state.options.exclude_duplicates);

        let hybrids = form.rows().into_iter().find(|r| r.field == Field::Hybrids).unwrap();
        assert_eq!(hybrids.value, "all exclude <only>");
    }
}
