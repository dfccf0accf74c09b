use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;

use crate::config::DashboardConfig;
use crate::form::StudentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    F,
    C,
    B,
    #[serde(rename = "B+")]
    BPlus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }

    pub fn gpa(self) -> f64 {
        match self {
            Grade::APlus => 4.0,
            Grade::A => 3.7,
            Grade::BPlus => 3.3,
            Grade::B => 3.0,
            Grade::C => 2.0,
            Grade::F => 0.0,
        }
    }
}

/// Lower bound (inclusive, percent) of each tier, checked top-down.
const GRADE_TIERS: [(f64, Grade); 5] = [
    (90.0, Grade::APlus),
    (80.0, Grade::A),
    (70.0, Grade::BPlus),
    (60.0, Grade::B),
    (50.0, Grade::C),
];

/// Maps an average percentage to its letter grade and GPA value. No rounding is
/// applied before comparison.
pub fn calculate_grade(average_percent: f64) -> (Grade, f64) {
    let grade = GRADE_TIERS
        .iter()
        .find(|(floor, _)| average_percent >= *floor)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::F);
    (grade, grade.gpa())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkStats {
    pub total: f64,
    pub average: f64,
}

pub fn mark_stats(marks: &[f64]) -> MarkStats {
    let total: f64 = marks.iter().sum();
    let average = if marks.is_empty() {
        0.0
    } else {
        total / marks.len() as f64
    };
    MarkStats { total, average }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub display_name: String,
    pub total: f64,
    pub average: f64,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub class_average: f64,
}

/// Draws `config.peer_count` simulated peers from `rng`, appends the current
/// student, and ranks everyone by total.
pub fn build_leaderboard<R: Rng>(
    rng: &mut R,
    student_name: &str,
    student_total: f64,
    config: &DashboardConfig,
) -> Leaderboard {
    let n = config.subject_count().max(1) as f64;
    let range = config.peer_total_range();
    let mut entries: Vec<LeaderboardEntry> = (1..=config.peer_count)
        .map(|i| {
            let total = rng.gen_range(range.clone()) as f64;
            LeaderboardEntry {
                rank: 0,
                display_name: format!("Student_{}", i),
                total,
                average: total / n,
                is_current: false,
            }
        })
        .collect();

    let display_name = if config.current_student_suffix.is_empty() {
        student_name.to_string()
    } else {
        format!("{} {}", student_name, config.current_student_suffix)
    };
    entries.push(LeaderboardEntry {
        rank: 0,
        display_name,
        total: student_total,
        average: student_total / n,
        is_current: true,
    });

    rank_entries(entries)
}

/// Stable sort, descending by total. Equal totals keep insertion order, so the
/// current student (always pushed last) ranks below peers with the same total.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>) -> Leaderboard {
    entries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = i + 1;
    }
    let class_average = if entries.is_empty() {
        0.0
    } else {
        entries.iter().map(|e| e.average).sum::<f64>() / entries.len() as f64
    };
    Leaderboard {
        entries,
        class_average,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMark {
    pub subject: String,
    pub mark: f64,
}

/// Everything derived from one successful generate. Replaced wholesale on the
/// next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: String,
    pub generated_at: String,
    pub student: StudentRecord,
    pub subjects: Vec<SubjectMark>,
    pub max_mark: u32,
    pub max_total: u32,
    pub total: f64,
    pub average: f64,
    pub grade: Grade,
    pub gpa: f64,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub class_average: f64,
}

pub fn build_report<R: Rng>(
    rng: &mut R,
    student: StudentRecord,
    config: &DashboardConfig,
) -> Report {
    let stats = mark_stats(&student.marks);
    let (grade, gpa) = calculate_grade(100.0 * stats.average / config.max_mark as f64);
    let board = build_leaderboard(rng, &student.name, stats.total, config);
    let subjects = config
        .subjects
        .iter()
        .zip(student.marks.iter())
        .map(|(s, m)| SubjectMark {
            subject: s.clone(),
            mark: *m,
        })
        .collect();

    Report {
        report_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        student,
        subjects,
        max_mark: config.max_mark,
        max_total: config.max_total(),
        total: stats.total,
        average: stats.average,
        grade,
        gpa,
        leaderboard: board.entries,
        class_average: board.class_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn student(marks: &[f64]) -> StudentRecord {
        StudentRecord {
            name: "Asha".to_string(),
            roll_number: "17".to_string(),
            class_name: "10-B".to_string(),
            attendance_percent: None,
            marks: marks.to_vec(),
        }
    }

    fn peer(name: &str, total: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            display_name: name.to_string(),
            total,
            average: total / 6.0,
            is_current: false,
        }
    }

    #[test]
    fn grade_table_boundaries() {
        let cases = [
            (100.0, "A+", 4.0),
            (90.0, "A+", 4.0),
            (89.999, "A", 3.7),
            (80.0, "A", 3.7),
            (79.99, "B+", 3.3),
            (70.0, "B+", 3.3),
            (60.0, "B", 3.0),
            (59.9999, "C", 2.0),
            (50.0, "C", 2.0),
            (49.99, "F", 0.0),
            (0.0, "F", 0.0),
        ];
        for (avg, grade, gpa) in cases {
            let (g, p) = calculate_grade(avg);
            assert_eq!(g.as_str(), grade, "average {}", avg);
            assert_eq!(p, gpa, "average {}", avg);
        }
    }

    #[test]
    fn grade_is_monotonic_in_average() {
        let mut prev = calculate_grade(0.0);
        for step in 1..=2000 {
            let cur = calculate_grade(step as f64 * 0.05);
            assert!(cur.0 >= prev.0);
            assert!(cur.1 >= prev.1);
            prev = cur;
        }
    }

    #[test]
    fn sample_marks_give_expected_grades() {
        let s = mark_stats(&[90.0, 85.0, 78.0, 92.0, 88.0, 95.0]);
        assert_eq!(s.total, 528.0);
        assert_eq!(s.average, 88.0);
        assert_eq!(calculate_grade(s.average), (Grade::A, 3.7));

        let s = mark_stats(&[45.0, 50.0, 30.0, 60.0, 40.0, 55.0]);
        assert_eq!(s.total, 280.0);
        assert!((s.average - 46.666_666).abs() < 1e-5);
        assert_eq!(calculate_grade(s.average), (Grade::F, 0.0));
    }

    #[test]
    fn leaderboard_has_everyone_sorted() {
        let cfg = DashboardConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let board = build_leaderboard(&mut rng, "Asha", 528.0, &cfg);
            assert_eq!(board.entries.len(), 8);
            assert!(board
                .entries
                .windows(2)
                .all(|w| w[0].total >= w[1].total));
            let me: Vec<_> = board.entries.iter().filter(|e| e.is_current).collect();
            assert_eq!(me.len(), 1);
            assert_eq!(me[0].display_name, "Asha (You)");
            assert_eq!(me[0].total, 528.0);
            assert_eq!(me[0].average, 88.0);
            for e in board.entries.iter().filter(|e| !e.is_current) {
                assert!((260.0..=580.0).contains(&e.total));
                assert_eq!(e.total.fract(), 0.0);
            }
            let ranks: Vec<usize> = board.entries.iter().map(|e| e.rank).collect();
            assert_eq!(ranks, (1..=8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn class_average_includes_current_student() {
        let board = rank_entries(vec![
            peer("Student_1", 300.0),
            peer("Student_2", 600.0),
            LeaderboardEntry {
                is_current: true,
                ..peer("Asha (You)", 0.0)
            },
        ]);
        assert!((board.class_average - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_current_student_below_peers() {
        let board = rank_entries(vec![
            peer("Student_1", 400.0),
            peer("Student_2", 528.0),
            peer("Student_3", 528.0),
            LeaderboardEntry {
                is_current: true,
                ..peer("Asha (You)", 528.0)
            },
        ]);
        let names: Vec<&str> = board
            .entries
            .iter()
            .map(|e| e.display_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Student_2", "Student_3", "Asha (You)", "Student_1"]
        );
    }

    #[test]
    fn seeded_rng_gives_repeatable_rankings() {
        let cfg = DashboardConfig::default();
        let a = build_leaderboard(&mut ChaCha8Rng::seed_from_u64(42), "Asha", 400.0, &cfg);
        let b = build_leaderboard(&mut ChaCha8Rng::seed_from_u64(42), "Asha", 400.0, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn report_uses_configured_max_mark() {
        let mut cfg = DashboardConfig::default();
        cfg.max_mark = 50;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let r = build_report(&mut rng, student(&[45.0, 45.0, 45.0, 45.0, 45.0, 45.0]), &cfg);
        assert_eq!(r.max_total, 300);
        assert_eq!(r.average, 45.0);
        assert_eq!(r.grade, Grade::APlus);
        assert_eq!(r.subjects[0].subject, "Maths");
        assert_eq!(r.subjects.len(), 6);
    }

    #[test]
    fn report_without_peers_is_just_the_student() {
        let mut cfg = DashboardConfig::default();
        cfg.peer_count = 0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let r = build_report(&mut rng, student(&[90.0, 85.0, 78.0, 92.0, 88.0, 95.0]), &cfg);
        assert_eq!(r.leaderboard.len(), 1);
        assert_eq!(r.class_average, 88.0);
        assert_eq!(r.grade, Grade::A);
        assert_eq!(r.gpa, 3.7);
    }
}
