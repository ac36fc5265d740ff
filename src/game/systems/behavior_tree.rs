//! Data-driven behavior tree
//!
//! Nodes hold plain condition and action values; the caller supplies the
//! function that answers conditions, so a tree can be shared between agents
//! and evaluated against each one's own state.

/// Result of evaluating a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorStatus {
    Success,
    Failure,
    /// An action was chosen and is in progress
    Running,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorNode<C, A> {
    /// Runs children in order until one fails
    Sequence(Vec<BehaviorNode<C, A>>),
    /// Runs children until one does not fail
    Selector(Vec<BehaviorNode<C, A>>),
    Condition(C),
    Inverter(Box<BehaviorNode<C, A>>),
    Action(A),
    AlwaysSucceed,
    AlwaysFail,
}

impl<C, A: Clone> BehaviorNode<C, A> {
    pub fn sequence(children: Vec<BehaviorNode<C, A>>) -> Self {
        BehaviorNode::Sequence(children)
    }

    pub fn selector(children: Vec<BehaviorNode<C, A>>) -> Self {
        BehaviorNode::Selector(children)
    }

    pub fn condition(condition: C) -> Self {
        BehaviorNode::Condition(condition)
    }

    pub fn action(action: A) -> Self {
        BehaviorNode::Action(action)
    }

    pub fn inverter(child: BehaviorNode<C, A>) -> Self {
        BehaviorNode::Inverter(Box::new(child))
    }

    /// Evaluate this node, asking `check` about each condition reached
    pub fn evaluate<F>(&self, check: &mut F) -> (BehaviorStatus, Option<A>)
    where
        F: FnMut(&C) -> bool,
    {
        match self {
            BehaviorNode::Sequence(children) => {
                let mut last_action = None;
                let mut running = false;
                for child in children {
                    let (status, action) = child.evaluate(check);
                    match status {
                        BehaviorStatus::Failure => return (BehaviorStatus::Failure, None),
                        BehaviorStatus::Running => running = true,
                        BehaviorStatus::Success => {}
                    }
                    if action.is_some() {
                        last_action = action;
                    }
                }
                let status = if running {
                    BehaviorStatus::Running
                } else {
                    BehaviorStatus::Success
                };
                (status, last_action)
            }
            BehaviorNode::Selector(children) => {
                for child in children {
                    let (status, action) = child.evaluate(check);
                    if status != BehaviorStatus::Failure {
                        return (status, action);
                    }
                }
                (BehaviorStatus::Failure, None)
            }
            BehaviorNode::Condition(condition) => {
                if check(condition) {
                    (BehaviorStatus::Success, None)
                } else {
                    (BehaviorStatus::Failure, None)
                }
            }
            BehaviorNode::Inverter(child) => {
                let (status, action) = child.evaluate(check);
                let inverted = match status {
                    BehaviorStatus::Success => BehaviorStatus::Failure,
                    BehaviorStatus::Failure => BehaviorStatus::Success,
                    BehaviorStatus::Running => BehaviorStatus::Running,
                };
                (inverted, action)
            }
            BehaviorNode::Action(action) => (BehaviorStatus::Running, Some(action.clone())),
            BehaviorNode::AlwaysSucceed => (BehaviorStatus::Success, None),
            BehaviorNode::AlwaysFail => (BehaviorStatus::Failure, None),
        }
    }
}
