use chrono::{DateTime, Duration, DurationRound, Utc};

use super::{Job, Resource, Schedule};
use crate::ui::theme;

/// Demo schedule of well-service jobs on four rigs, laid out around `now`.
///
/// Each rig's jobs are back to back, so the schedule starts out gap-free.
pub fn sample_schedule(now: DateTime<Utc>) -> Schedule {
    let today = now.duration_trunc(Duration::days(1)).unwrap_or(now);

    let rigs: [(&str, i64, &[(&str, &str, i64)]); 4] = [
        (
            "GNDC-S1",
            -12,
            &[
                ("M-201", "Workover", 10),
                ("S-112", "Sidetrack", 9),
                ("SP-45", "Re-entry", 5),
                ("W-113", "Workover", 7),
                ("W-114", "ESP swap", 6),
            ],
        ),
        (
            "GNDC-S2",
            -8,
            &[
                ("W-201", "Workover", 8),
                ("M-310", "Re Completion", 12),
                ("S-220", "New Drilling", 14),
            ],
        ),
        (
            "GNDC-S3",
            -3,
            &[
                ("K-77", "Acid job", 4),
                ("K-78", "Perforation", 6),
                ("K-81", "Workover", 9),
                ("K-90", "ESP install", 5),
            ],
        ),
        (
            "HOIST-1",
            5,
            &[("H-12", "Tubing change", 6), ("H-19", "Gas lift", 8)],
        ),
    ];

    let mut resources = Vec::new();
    let mut jobs = Vec::new();
    for (row, (rig, offset_days, work)) in rigs.iter().enumerate() {
        resources.push(Resource::new(*rig));
        let mut cursor = today + Duration::days(*offset_days);
        for (id, scope, days) in work.iter() {
            let end = cursor + Duration::days(*days);
            let mut job = Job::new(*id, row, cursor, end);
            job.name = format!("{} {}", id, scope);
            job.color = theme::job_color(jobs.len());
            job.fields = vec![
                ("scope".to_string(), scope.to_string()),
                ("team".to_string(), "WRO".to_string()),
            ];
            jobs.push(job);
            cursor = end;
        }
    }

    Schedule::new(resources, jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_rows_are_contiguous() {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 14, 0, 0).unwrap();
        let schedule = sample_schedule(now);
        assert_eq!(schedule.resource_count(), 4);
        for row in 0..schedule.resource_count() {
            let on_row = schedule.jobs_on(row);
            assert!(!on_row.is_empty());
            for pair in on_row.windows(2) {
                assert_eq!(schedule.jobs[pair[0]].end, schedule.jobs[pair[1]].start);
            }
        }
    }
}
