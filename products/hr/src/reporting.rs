//! Reporting structure: how many employees sit anywhere below a given employee.
//!
//! The count is transitive. Every employee reachable through direct reports is
//! included, not only the immediate ones. That matches what the reporting endpoint has
//! always returned, so treat it as a product decision rather than something to
//! "fix" back to a direct-report count.
//!
//! The input tree is not trusted to be a tree. A shared report or a cycle shows up as
//! the same `employee_id` in several places; each identifier is counted at most once
//! per call.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    error::{HrError, HrResult},
    model::{Employee, ReportingStructure},
};

/// Computes [`ReportingStructure`] values. Stateless; every call owns its own
/// visited set, so one calculator may be shared freely.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportingStructureCalculator;

impl ReportingStructureCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Pairs `subject` with its total number of reports.
    ///
    /// An absent subject is an error rather than zero: callers resolve existence
    /// first and decide how "not found" looks to their own clients.
    pub fn compute(&self, subject: Option<Employee>) -> HrResult<ReportingStructure> {
        let employee =
            subject.ok_or_else(|| HrError::invalid("reporting structure requires an employee"))?;
        let number_of_reports = count_reports(&employee);
        Ok(ReportingStructure {
            employee,
            number_of_reports,
        })
    }
}

/// Number of distinct employees reachable from `subject` through direct reports.
///
/// Walks with an explicit stack, so hierarchy depth never touches the call stack.
/// `counted` guards the total; `expanded` guards the walk. A repeated identifier with
/// no reports of its own is only a reference, so it does not consume the expansion
/// and a fuller copy of the same employee found later is still walked.
pub fn count_reports(subject: &Employee) -> usize {
    let mut counted: HashSet<Uuid> = HashSet::from([subject.employee_id]);
    let mut expanded: HashSet<Uuid> = HashSet::from([subject.employee_id]);
    let mut stack: Vec<&Employee> = vec![subject];
    let mut total = 0;

    while let Some(node) = stack.pop() {
        for report in &node.direct_reports {
            if counted.insert(report.employee_id) {
                total += 1;
            }
            if !report.direct_reports.is_empty() && expanded.insert(report.employee_id) {
                stack.push(report);
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> Employee {
        Employee::new(Uuid::new_v4(), name, "Tester", "Engineer", "Engineering")
    }

    fn compute(subject: &Employee) -> usize {
        ReportingStructureCalculator::new()
            .compute(Some(subject.clone()))
            .unwrap()
            .number_of_reports
    }

    #[test]
    fn employee_without_reports_has_none() {
        let loner = person("Loner");
        assert_eq!(compute(&loner), 0);
    }

    #[test]
    fn counts_direct_reports() {
        let leader = person("Brendan").with_reports(vec![person("Ryan"), person("Spencer")]);
        assert_eq!(compute(&leader), 2);
    }

    #[test]
    fn counts_reports_at_every_depth() {
        let underling1 = person("Ryan").with_reports(vec![person("Dallon"), person("Jon")]);
        let underling2 = person("Spencer").with_reports(vec![person("Dan")]);
        let leader = person("Brendan").with_reports(vec![underling1, underling2]);
        assert_eq!(compute(&leader), 5);
    }

    #[test]
    fn cycle_back_to_subject_is_not_counted() {
        let leader = person("Leader");
        let echo = Employee {
            direct_reports: Vec::new(),
            ..leader.clone()
        };
        let underling = person("Underling").with_reports(vec![echo]);
        let leader = leader.with_reports(vec![underling]);
        assert_eq!(compute(&leader), 1);
    }

    #[test]
    fn cycle_below_subject_terminates() {
        // Leader -> A -> B -> A, materialized with a full copy of A under B.
        let a = person("A");
        let b = person("B");
        let a_again = a.clone().with_reports(vec![b.clone()]);
        let b_full = b.clone().with_reports(vec![a_again]);
        let a_full = a.with_reports(vec![b_full]);
        let leader = person("Leader").with_reports(vec![a_full]);
        assert_eq!(compute(&leader), 2);
    }

    #[test]
    fn shared_report_is_counted_once() {
        let shared = person("Shared");
        let u1 = person("U1").with_reports(vec![shared.clone()]);
        let u2 = person("U2").with_reports(vec![shared]);
        let leader = person("Leader").with_reports(vec![u1, u2]);
        assert_eq!(compute(&leader), 3);
    }

    #[test]
    fn reference_stub_does_not_hide_a_later_full_copy() {
        let shared = person("Shared");
        let below_shared = person("Below");
        let stub = shared.clone();
        let full = shared.with_reports(vec![below_shared]);
        // The stack pops the last report first, so list the full copy first to make
        // the stub the first occurrence walked.
        let leader = person("Leader").with_reports(vec![
            person("U1").with_reports(vec![full]),
            person("U2").with_reports(vec![stub]),
        ]);
        assert_eq!(compute(&leader), 4);
    }

    fn ternary_tree(depth: u32, nodes: &mut usize) -> Employee {
        *nodes += 1;
        let node = person(&format!("depth{depth}"));
        if depth == 0 {
            return node;
        }
        let reports = (0..3).map(|_| ternary_tree(depth - 1, nodes)).collect();
        node.with_reports(reports)
    }

    #[test]
    fn tree_count_is_node_count_minus_one() {
        let mut nodes = 0;
        let root = ternary_tree(4, &mut nodes);
        assert_eq!(nodes, 121);
        assert_eq!(compute(&root), nodes - 1);
    }

    #[test]
    fn repeated_calls_agree() {
        let leader = person("Leader").with_reports(vec![
            person("A").with_reports(vec![person("C")]),
            person("B"),
        ]);
        let calculator = ReportingStructureCalculator::new();
        let first = calculator.compute(Some(leader.clone())).unwrap();
        let second = calculator.compute(Some(leader.clone())).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.number_of_reports, 3);
        assert_eq!(first.employee, leader);
    }

    #[test]
    fn absent_subject_is_invalid_input() {
        let err = ReportingStructureCalculator::new().compute(None).unwrap_err();
        assert!(matches!(err, HrError::InvalidInput(_)));
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut node = person("bottom");
        for depth in 0..2_000 {
            node = person(&format!("level{depth}")).with_reports(vec![node]);
        }
        assert_eq!(count_reports(&node), 2_000);
    }
}
