use crate::models::{Course, Snapshot};

// Flattens every course of a snapshot: transcript order, then semester,
// category and course order.
pub fn extract_courses(snapshot: &Snapshot) -> Vec<&Course> {
    snapshot.transcripts.iter().flat_map(|t| t.courses()).collect()
}

// Returns the courses of `actual` that have no identical counterpart
// anywhere in `previous`, in `actual`'s order, or `None` when there are none.
// A course whose grade or percent changed is a different record and is
// therefore reported as new.
pub fn compare(previous: &Snapshot, actual: &Snapshot) -> Option<Vec<Course>> {
    let known = extract_courses(previous);
    let changed: Vec<Course> = extract_courses(actual)
        .into_iter()
        .filter(|course| !known.contains(course))
        .cloned()
        .collect();

    if changed.is_empty() {
        None
    } else {
        Some(changed)
    }
}
