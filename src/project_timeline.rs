use serde::{Deserialize, Serialize};

/// The year-indexed horizon of a project: a run of construction years followed by a run of
/// operating years, starting at a base calendar year.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct ProjectTimeline {
    construction_periods: usize,
    operating_periods: usize,
    base_year: i32,
}

impl ProjectTimeline {
    pub fn new(construction_periods: usize, operating_periods: usize, base_year: i32) -> Self {
        Self {
            construction_periods,
            operating_periods,
            base_year,
        }
    }

    pub fn construction_periods(&self) -> usize {
        self.construction_periods
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    pub fn total_periods(&self) -> usize {
        self.construction_periods + self.operating_periods
    }

    pub fn is_construction_year(&self, index: usize) -> bool {
        index < self.construction_periods
    }

    /// Calendar year of the final period, if it can be represented.
    pub fn last_year(&self) -> Option<i32> {
        let offset = i32::try_from(self.total_periods().checked_sub(1)?).ok()?;
        self.base_year.checked_add(offset)
    }

    pub fn iter(&self) -> ProjectTimelineIterator {
        ProjectTimelineIterator::from(*self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectPhase {
    Construction,
    Operation,
}

#[derive(Clone, Copy, Debug)]
pub struct YearIteration {
    pub index: usize,
    pub year: i32,
    pub phase: ProjectPhase,
}

impl YearIteration {
    pub fn is_construction(&self) -> bool {
        self.phase == ProjectPhase::Construction
    }

    /// Position of this year within the operating run, if it is an operating year.
    pub fn operating_index(&self, timeline: &ProjectTimeline) -> Option<usize> {
        match self.phase {
            ProjectPhase::Construction => None,
            ProjectPhase::Operation => Some(self.index - timeline.construction_periods),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProjectTimelineIterator {
    current_index: usize,
    timeline: ProjectTimeline,
}

impl ProjectTimelineIterator {
    fn from(timeline: ProjectTimeline) -> Self {
        Self {
            current_index: 0,
            timeline,
        }
    }
}

impl Iterator for ProjectTimelineIterator {
    type Item = YearIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.timeline.total_periods() {
            return None;
        }

        let index = self.current_index;
        self.current_index += 1;

        Some(YearIteration {
            index,
            year: i32::try_from(index)
                .ok()
                .and_then(|offset| self.timeline.base_year.checked_add(offset))
                .unwrap_or(i32::MAX),
            phase: if self.timeline.is_construction_year(index) {
                ProjectPhase::Construction
            } else {
                ProjectPhase::Operation
            },
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.timeline.total_periods() - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProjectTimelineIterator {}
