#![allow(missing_docs)]

use std::thread;

use plantree::{
    convert_to_plan_tree, source::DumpSource, NodeId, PlanAnalyser, PlanForest, PlanNode,
    PlanStep, StepIndex, Value,
};
use proptest::prelude::*;

fn steps_from_groups(groups: &[Option<i64>]) -> Vec<PlanStep> {
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| PlanStep::new(*group).with("seq", idx as i64))
        .collect()
}

/// Expected step indices under each root, computed directly from the grouping rules.
fn expected_roots(groups: &[Option<i64>]) -> Vec<Vec<StepIndex>> {
    let mut roots = Vec::new();
    let mut claimed = vec![false; groups.len()];
    for id in 1_i64.. {
        let members: Vec<usize> = (0..groups.len())
            .filter(|&i| groups[i] == Some(id))
            .collect();
        if members.is_empty() {
            break;
        }
        for &i in &members {
            claimed[i] = true;
        }
        roots.push(members.into_iter().map(StepIndex).collect());
    }
    for (i, done) in claimed.iter().enumerate() {
        if !done {
            roots.push(vec![StepIndex(i)]);
        }
    }
    roots
}

fn assert_links_consistent(forest: &PlanForest) {
    for &root in forest.roots() {
        assert_eq!(forest.parent(root), None, "root {root:?} has a parent");
        forest.walk(root, |id, _| {
            for child in forest.children(id) {
                assert_eq!(forest.parent(child), Some(id));
            }
        });
    }
}

fn arb_groups() -> impl Strategy<Value = Vec<Option<i64>>> {
    prop::collection::vec(prop::option::weighted(0.8, -1_i64..6), 0..40)
}

proptest! {
    #[test]
    fn prop_every_step_lands_exactly_once(groups in arb_groups()) {
        let forest = convert_to_plan_tree(steps_from_groups(&groups));
        let mut seen: Vec<StepIndex> = forest
            .roots()
            .iter()
            .flat_map(|root| forest.leaf_steps(*root))
            .collect();
        seen.sort();
        let all: Vec<StepIndex> = (0..groups.len()).map(StepIndex).collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn prop_roots_follow_grouping_rules(groups in arb_groups()) {
        let forest = convert_to_plan_tree(steps_from_groups(&groups));
        let actual: Vec<Vec<StepIndex>> = forest
            .roots()
            .iter()
            .map(|root| forest.leaf_steps(*root))
            .collect();
        prop_assert_eq!(actual, expected_roots(&groups));
        assert_links_consistent(&forest);
    }

    #[test]
    fn prop_one_join_per_extra_group_member(groups in arb_groups()) {
        let forest = convert_to_plan_tree(steps_from_groups(&groups));
        let joins: usize = expected_roots(&groups).iter().map(|r| r.len() - 1).sum();
        prop_assert_eq!(forest.node_count(), groups.len() + joins);
    }
}

fn table(forest: &PlanForest, id: NodeId) -> String {
    forest
        .leaf_step(id)
        .and_then(|step| step.column("table"))
        .map(Value::to_string)
        .unwrap_or_default()
}

#[test]
fn mysql_union_plan_keeps_union_result_last() {
    let dump = DumpSource::from_json_str(
        "union.json",
        r#"[
            {"id": 1, "select_type": "PRIMARY", "table": "customers", "type": "ALL"},
            {"id": 2, "select_type": "UNION", "table": "suppliers", "type": "ALL"},
            {"id": null, "select_type": "UNION RESULT", "table": "<union1,2>", "type": "ALL"}
        ]"#,
    )
    .expect("parse dump");
    let mut source = dump;
    let mut analyser =
        PlanAnalyser::new("SELECT city FROM customers UNION SELECT city FROM suppliers");
    let forest = analyser.explain(&mut source).expect("explain union");
    let tables: Vec<String> = forest.roots().iter().map(|r| table(forest, *r)).collect();
    assert_eq!(tables, ["customers", "suppliers", "<union1,2>"]);
}

#[test]
fn mysql_join_with_dependent_subquery() {
    let dump = DumpSource::from_csv_str(
        "join.csv",
        "id,select_type,table,type,key,rows,Extra\n\
         1,PRIMARY,o,ALL,,1000,Using where\n\
         1,PRIMARY,c,eq_ref,PRIMARY,1,\n\
         2,DEPENDENT SUBQUERY,i,ref,idx_order,4,Using index\n",
    )
    .expect("parse dump");
    let mut source = dump;
    let mut analyser = PlanAnalyser::new(
        "select * from orders o join customers c on c.id = o.customer_id \
         where exists (select 1 from items i where i.order_id = o.id)",
    );
    let forest = analyser.explain(&mut source).expect("explain join");
    assert_eq!(forest.len(), 2);

    let join = forest.roots()[0];
    match *forest.node(join) {
        PlanNode::Join { left, right } => {
            assert_eq!(table(forest, left), "o");
            assert_eq!(table(forest, right), "c");
        }
        ref other => panic!("expected join root, found {other:?}"),
    }
    assert_eq!(table(forest, forest.roots()[1]), "i");
}

#[test]
fn independent_builds_run_concurrently() {
    let inputs: Vec<Vec<Option<i64>>> = (0..8_i64)
        .map(|seed| (0..20).map(|i| Some((i * seed) % 4)).collect())
        .collect();
    let sequential: Vec<serde_json::Value> = inputs
        .iter()
        .map(|groups| {
            serde_json::to_value(convert_to_plan_tree(steps_from_groups(groups)))
                .expect("serialize")
        })
        .collect();

    let concurrent: Vec<serde_json::Value> = thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|groups| {
                scope.spawn(move || {
                    serde_json::to_value(convert_to_plan_tree(steps_from_groups(groups)))
                        .expect("serialize")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("builder thread panicked"))
            .collect()
    });
    assert_eq!(sequential, concurrent);
}
