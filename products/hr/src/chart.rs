use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::Employee;

/// A loaded slice of the reporting graph, keyed by employee identifier.
///
/// The store fills it breadth first, one level at a time, recording the level at
/// which each employee was first reached. [`OrgChart::into_tree`] then turns it into
/// the nested [`Employee`] value handed to callers.
#[derive(Clone, Debug)]
pub struct OrgChart {
    root: Uuid,
    employees: HashMap<Uuid, Employee>,
    levels: HashMap<Uuid, usize>,
    reports: HashMap<Uuid, Vec<Uuid>>,
}

impl OrgChart {
    pub fn new(root: Employee) -> Self {
        let root_id = root.employee_id;
        Self {
            root: root_id,
            employees: HashMap::from([(root_id, strip(root))]),
            levels: HashMap::from([(root_id, 0)]),
            reports: HashMap::new(),
        }
    }

    pub fn root(&self) -> Uuid {
        self.root
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.employees.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Adds an employee first reached at `level`. Re-inserting a known identifier is
    /// ignored; the shallowest level wins.
    pub fn insert(&mut self, employee: Employee, level: usize) {
        let id = employee.employee_id;
        if self.employees.contains_key(&id) {
            return;
        }
        self.employees.insert(id, strip(employee));
        self.levels.insert(id, level);
    }

    /// Records `manager`'s ordered direct reports.
    pub fn link(&mut self, manager: Uuid, reports: Vec<Uuid>) {
        self.reports.insert(manager, reports);
    }

    pub fn direct_reports(&self, manager: &Uuid) -> &[Uuid] {
        self.reports.get(manager).map(Vec::as_slice).unwrap_or_default()
    }

    /// Materializes the chart as a tree rooted at [`OrgChart::root`].
    ///
    /// Each employee's reports are written out once, at the level where the loader
    /// first reached it. Every other occurrence (a second manager, or a cycle back up
    /// the chain) is a reference without reports. The tree is therefore no deeper than
    /// the number of levels loaded. Edges to employees that were never loaded are
    /// dropped.
    pub fn into_tree(self) -> Employee {
        // Walk in preorder with an explicit stack, then assemble children before parents.
        let mut expanded = HashSet::new();
        let mut nodes: Vec<Option<Employee>> = Vec::new();
        let mut children: Vec<Vec<usize>> = Vec::new();
        let mut stack: Vec<(Uuid, _, Option<usize>)> = vec![(self.root, 0, None)];

        while let Some((id, level, parent)) = stack.pop() {
            let Some(employee) = self.employees.get(&id) else {
                continue;
            };
            let index = nodes.len();
            nodes.push(Some(employee.clone()));
            children.push(Vec::new());
            if let Some(parent) = parent {
                children[parent].push(index);
            }

            let first_reached_here = self.levels.get(&id) == Some(&level);
            if !first_reached_here || !expanded.insert(id) {
                continue;
            }
            for report in self.direct_reports(&id).iter().rev() {
                if self.employees.contains_key(report) {
                    stack.push((*report, level + 1, Some(index)));
                }
            }
        }

        for index in (0..nodes.len()).rev() {
            let reports = children[index]
                .iter()
                .filter_map(|child| nodes[*child].take())
                .collect();
            if let Some(node) = nodes[index].as_mut() {
                node.direct_reports = reports;
            }
        }
        nodes
            .first_mut()
            .and_then(Option::take)
            .unwrap_or_else(|| self.employees[&self.root].clone())
    }
}

fn strip(mut employee: Employee) -> Employee {
    employee.direct_reports = Vec::new();
    employee
}
