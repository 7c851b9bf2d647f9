//! Reachable lecture set of a course
//!
//! A course reaches lectures two ways: directly through its own lecture list
//! and through each of its modules. The outline is the one place those two
//! paths are merged, in display order: direct lectures first, then modules in
//! course order with their lectures in module order.

use std::collections::{HashMap, HashSet};

use crate::course::{Course, Lecture, Module};
use crate::ids::LectureId;

/// A module with its resolved lectures
#[derive(Debug, Clone)]
pub struct OutlineModule {
    pub module: Module,
    pub lectures: Vec<Lecture>,
}

/// Ordered, de-duplicated view of every lecture a course reaches
#[derive(Debug, Clone, Default)]
pub struct CourseOutline {
    pub standalone: Vec<Lecture>,
    pub modules: Vec<OutlineModule>,
    ids: HashSet<LectureId>,
}

impl CourseOutline {
    /// Resolve a course's structure from the modules and lectures stored for it.
    ///
    /// References to documents that are missing are skipped, as are modules
    /// the course no longer lists. A lecture referenced from more than one
    /// place appears once, at its first position.
    pub fn build(course: &Course, modules: Vec<Module>, lectures: Vec<Lecture>) -> Self {
        let mut modules: HashMap<_, _> = modules.into_iter().map(|m| (m.id, m)).collect();
        let mut lectures: HashMap<_, _> = lectures.into_iter().map(|l| (l.id, l)).collect();
        let mut ids = HashSet::new();

        let mut take = |id: &LectureId| -> Option<Lecture> {
            if ids.contains(id) {
                return None;
            }
            let lecture = lectures.remove(id)?;
            ids.insert(*id);
            Some(lecture)
        };

        let standalone = course.lectures.iter().filter_map(&mut take).collect();

        let modules = course
            .modules
            .iter()
            .filter_map(|id| modules.remove(id))
            .map(|module| {
                let lectures = module.lectures.iter().filter_map(&mut take).collect();
                OutlineModule { module, lectures }
            })
            .collect();

        Self {
            standalone,
            modules,
            ids,
        }
    }

    /// Every reachable lecture in display order
    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> {
        self.standalone
            .iter()
            .chain(self.modules.iter().flat_map(|m| m.lectures.iter()))
    }

    pub fn lecture_ids(&self) -> &HashSet<LectureId> {
        &self.ids
    }

    pub fn total_lectures(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, lecture: LectureId) -> bool {
        self.ids.contains(&lecture)
    }

    pub fn find(&self, lecture: LectureId) -> Option<&Lecture> {
        if !self.contains(lecture) {
            return None;
        }
        self.lectures().find(|l| l.id == lecture)
    }

    /// Total runtime of every reachable lecture, in seconds
    pub fn total_duration(&self) -> u64 {
        self.lectures().map(|l| u64::from(l.duration)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::LectureParent;
    use crate::ids::{ModuleId, UserId};

    fn setup() -> (Course, Vec<Module>, Vec<Lecture>) {
        let mut course = Course::new("Systems", UserId::new());
        let direct = Lecture::new(course.id, LectureParent::Course(course.id), "Welcome");
        course.lectures.push(direct.id);

        let mut m1 = Module::new(course.id, "Basics");
        let mut m2 = Module::new(course.id, "Advanced");
        let a = Lecture::new(course.id, LectureParent::Module(m1.id), "A");
        let b = Lecture::new(course.id, LectureParent::Module(m1.id), "B");
        let c = Lecture::new(course.id, LectureParent::Module(m2.id), "C");
        m1.lectures = vec![a.id, b.id];
        m2.lectures = vec![c.id];
        course.modules = vec![m2.id, m1.id];

        (course, vec![m1, m2], vec![c, b, a, direct])
    }

    #[test]
    fn test_order_follows_course_then_module_lists() {
        let (course, modules, lectures) = setup();
        let outline = CourseOutline::build(&course, modules, lectures);

        let titles: Vec<_> = outline.lectures().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Welcome", "C", "A", "B"]);
        assert_eq!(outline.total_lectures(), 4);
        assert_eq!(outline.modules[0].module.title, "Advanced");
    }

    #[test]
    fn test_missing_references_are_skipped() {
        let (mut course, mut modules, lectures) = setup();
        modules[0].lectures.push(LectureId::new());
        course.modules.push(ModuleId::new());

        let outline = CourseOutline::build(&course, modules, lectures);
        assert_eq!(outline.total_lectures(), 4);
        assert_eq!(outline.modules.len(), 2);
    }

    #[test]
    fn test_unlisted_module_is_not_reachable() {
        let (mut course, modules, lectures) = setup();
        let dropped = course.modules.remove(0);

        let outline = CourseOutline::build(&course, modules, lectures);
        assert_eq!(outline.total_lectures(), 3);
        assert!(outline.modules.iter().all(|m| m.module.id != dropped));
    }

    #[test]
    fn test_duplicate_reference_counted_once() {
        let (mut course, modules, lectures) = setup();
        let shared = modules[0].lectures[0];
        course.lectures.push(shared);

        let outline = CourseOutline::build(&course, modules, lectures);
        assert_eq!(outline.total_lectures(), 4);
        assert_eq!(outline.standalone.len(), 2);
        assert_eq!(outline.modules.iter().map(|m| m.lectures.len()).sum::<usize>(), 2);
        assert!(outline.find(shared).is_some());
    }
}
