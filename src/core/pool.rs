use crate::models::Candidate;

/// The shrinking set of candidates still available during one run
///
/// Candidates keep the index they had in the loaded list for the whole run,
/// which is what ties are broken on.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    slots: Vec<Option<Candidate>>,
    remaining: usize,
}

impl CandidatePool {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let remaining = candidates.len();
        Self {
            slots: candidates.into_iter().map(Some).collect(),
            remaining,
        }
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Available candidates with their original index, in index order
    pub fn available(&self) -> impl Iterator<Item = (usize, &Candidate)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|candidate| (index, candidate)))
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Remove a candidate from further consideration
    pub fn take(&mut self, index: usize) -> Option<Candidate> {
        let taken = self.slots.get_mut(index).and_then(Option::take);
        if taken.is_some() {
            self.remaining -= 1;
        }
        taken
    }

    /// Put a taken candidate back at its original index
    pub fn restore(&mut self, index: usize, candidate: Candidate) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                self.remaining += 1;
            }
            *slot = Some(candidate);
        }
    }
}
