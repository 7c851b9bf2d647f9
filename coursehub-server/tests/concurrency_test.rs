//! Concurrent ledger write tests

use std::collections::HashSet;
use std::thread;

use coursehub_core::{check_publish, Course, Lecture, LectureId, LectureParent, User};
use coursehub_server::ledger;
use coursehub_server::{CourseStore, InMemoryStore, ProgressStore, SqliteStore, Store, UserStore};
use tempfile::TempDir;

const LECTURES: usize = 12;

fn published_course<S: Store>(store: &S) -> (Course, Vec<LectureId>) {
    let mut course = Course::new("Threads", User::new("Ina", "ina@example.com").id);
    course.published = true;

    let mut ids = Vec::new();
    for i in 0..LECTURES {
        let mut lecture = Lecture::new(course.id, LectureParent::Course(course.id), format!("L{}", i));
        lecture.video_url = Some(format!("https://cdn.example.com/{}.mp4", i));
        store.insert_lecture(&lecture).unwrap();
        course.lectures.push(lecture.id);
        ids.push(lecture.id);
    }
    store.insert_course(&course).unwrap();
    (course, ids)
}

/// Every thread views a different lecture of the same course for one student
fn assert_parallel_views_kept<S: Store>(store: &S) {
    let (course, lectures) = published_course(store);
    let student = User::new("Sam", "sam@example.com");
    store.insert_user(&student).unwrap();

    thread::scope(|scope| {
        for &lecture in &lectures {
            scope.spawn(move || {
                ledger::set_lecture_viewed(store, course.id, lecture, student.id, true).unwrap();
            });
        }
    });

    let progress = store.get_progress(student.id, course.id).unwrap().unwrap();
    let reachable: HashSet<LectureId> = lectures.iter().copied().collect();
    let summary = progress.summarize(&reachable);
    assert_eq!(summary.viewed_count, LECTURES);
    assert!(summary.completed);
    assert!(progress.completed);

    let stored = store.get_course(course.id).unwrap().unwrap();
    assert_eq!(stored.enrollments.len(), 1);

    let user = store.get_user(student.id).unwrap().unwrap();
    assert_eq!(user.enrolled_courses, vec![course.id]);
}

/// A publish racing against removal of the only lecture never leaves an
/// empty course published
fn assert_publish_race_safe<S: Store>(store: &S) {
    for _ in 0..25 {
        let (course, lectures) = published_course(store);
        let last = lectures[LECTURES - 1];
        store
            .modify_course(course.id, &mut |c| {
                c.published = false;
                c.lectures.truncate(1);
                c.lectures[0] = last;
            })
            .unwrap();

        thread::scope(|scope| {
            scope.spawn(|| {
                store
                    .modify_course_with_outline(course.id, &mut |c, outline| {
                        c.published = check_publish(outline, true).is_ok();
                    })
                    .unwrap();
            });
            scope.spawn(|| {
                store
                    .modify_course(course.id, &mut |c| c.lectures.retain(|l| *l != last))
                    .unwrap();
                store
                    .modify_course_with_outline(course.id, &mut |c, outline| {
                        if outline.is_empty() {
                            c.published = false;
                        }
                    })
                    .unwrap();
            });
        });

        let stored = store.get_course(course.id).unwrap().unwrap();
        let outline = store.load_outline(&stored).unwrap();
        assert!(outline.is_empty());
        assert!(!stored.published);
    }
}

/// Test: publish decisions see the outline they are written against
#[test]
fn test_publish_race_in_memory() {
    assert_publish_race_safe(&InMemoryStore::new());
}

/// Test: publish decisions see the outline they are written against on SQLite
#[test]
fn test_publish_race_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("publish.db");
    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    assert_publish_race_safe(&store);
}

/// Test: parallel views are all kept by the in-memory store
#[test]
fn test_parallel_views_in_memory() {
    assert_parallel_views_kept(&InMemoryStore::new());
}

/// Test: parallel views are all kept by the SQLite store
#[test]
fn test_parallel_views_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("parallel.db");
    let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
    assert_parallel_views_kept(&store);
}
