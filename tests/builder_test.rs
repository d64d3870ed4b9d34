//! Tests for ForestBuilder root detection and linking

use rstest::rstest;

use catsel::domain::{build_forest, Category, CategoryForest, DomainError, ForestBuilder};

fn root_ids(forest: &CategoryForest) -> Vec<String> {
    forest.root_data().iter().map(|d| d.id.clone()).collect()
}

fn child_ids(forest: &CategoryForest, id: &str) -> Vec<String> {
    forest
        .node_by_id(id)
        .unwrap()
        .children
        .iter()
        .map(|&idx| forest.get_node(idx).unwrap().data.id.clone())
        .collect()
}

//      A        D
//     / \
//    B   C
//    |
//    E
fn flat_catalog() -> Vec<Category> {
    vec![
        Category::new("A", "Apparel"),
        Category::new("B", "Shirts").with_parent("A"),
        Category::new("C", "Socks").with_parent("A"),
        Category::new("D", "Decor"),
        Category::new("E", "Polo").with_parent("B"),
    ]
}

#[test]
fn given_empty_input_when_building_then_no_roots() {
    // Arrange
    let mut builder = ForestBuilder::new();

    // Act
    let forest = builder.build(&[]);

    // Assert
    assert!(forest.is_empty());
    assert!(forest.roots().is_empty());
    assert_eq!(forest.depth(), 0);
}

#[test]
fn given_flat_list_with_consistent_parents_when_building_then_roots_are_null_parent_records() {
    // Arrange
    let categories = flat_catalog();

    // Act
    let forest = build_forest(&categories);

    // Assert
    let expected: Vec<String> = categories
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(root_ids(&forest), expected);
    assert_eq!(child_ids(&forest, "A"), vec!["B", "C"]);
    assert_eq!(child_ids(&forest, "B"), vec!["E"]);
    assert_eq!(forest.depth(), 3);
}

#[test]
fn given_nested_records_when_building_then_children_are_linked_in_order() {
    // Arrange
    let categories = vec![Category::new("A", "Apparel").with_children(vec![
        Category::new("B", "Shirts")
            .with_parent("A")
            .with_children(vec![Category::new("E", "Polo").with_parent("B")]),
        Category::new("C", "Socks").with_parent("A"),
    ])];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A"]);
    assert_eq!(child_ids(&forest, "A"), vec!["B", "C"]);
    assert_eq!(child_ids(&forest, "B"), vec!["E"]);
    assert_eq!(forest.len(), 4);
}

#[test]
fn given_nested_and_flat_duplicates_when_building_then_links_are_not_doubled() {
    // Arrange: B is nested under A and also listed flat with parentId A
    let categories = vec![
        Category::new("A", "Apparel")
            .with_children(vec![Category::new("B", "Shirts").with_parent("A")]),
        Category::new("B", "Shirts (flat)").with_parent("A"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A"]);
    assert_eq!(child_ids(&forest, "A"), vec!["B"]);
    assert_eq!(forest.node_by_id("B").unwrap().data.name, "Shirts (flat)");
    assert!(forest.validate().is_empty());
}

#[test]
fn given_duplicate_root_records_when_building_then_roots_are_unique_and_last_wins() {
    // Arrange
    let categories = vec![
        Category::new("A", "First"),
        Category::new("D", "Decor"),
        Category::new("A", "Second"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A", "D"]);
    assert_eq!(forest.node_by_id("A").unwrap().data.name, "Second");
}

#[test]
fn given_dangling_parent_reference_when_building_then_record_becomes_root() {
    // Arrange
    let categories = vec![
        Category::new("A", "Apparel"),
        Category::new("X", "Orphan").with_parent("missing"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A", "X"]);
}

#[test]
fn given_record_with_parent_listed_before_it_when_building_then_order_does_not_matter() {
    // Arrange: child appears before its parent
    let categories = vec![
        Category::new("B", "Shirts").with_parent("A"),
        Category::new("A", "Apparel"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A"]);
    assert_eq!(child_ids(&forest, "A"), vec!["B"]);
}

#[test]
fn given_explicit_null_parent_nested_elsewhere_when_building_then_still_root() {
    // Arrange: malformed, D has no parent yet is nested under A
    let categories = vec![
        Category::new("A", "Apparel").with_children(vec![Category::new("D", "Decor")]),
        Category::new("D", "Decor"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A", "D"]);
}

#[test]
fn given_flat_child_before_nested_copy_without_parent_when_building_then_not_a_root() {
    // Arrange: the later nested copy of B carries no parentId
    let categories = vec![
        Category::new("B", "Shirts").with_parent("A"),
        Category::new("A", "Apparel").with_children(vec![Category::new("B", "Shirts")]),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["A"]);
    assert_eq!(child_ids(&forest, "A"), vec!["B"]);
    let order: Vec<String> = forest.iter().map(|(_, n)| n.data.id.clone()).collect();
    assert_eq!(order, vec!["A", "B"]);
}

#[test]
fn given_duplicate_records_with_different_parents_when_building_then_both_links_kept() {
    // Arrange: B declared under X first, then nested without parentId under A
    let categories = vec![
        Category::new("X", "x"),
        Category::new("B", "b").with_parent("X"),
        Category::new("A", "a").with_children(vec![Category::new("B", "b")]),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(root_ids(&forest), vec!["X", "A"]);
    assert_eq!(child_ids(&forest, "X"), vec!["B"]);
    assert_eq!(child_ids(&forest, "A"), vec!["B"]);
    assert_eq!(
        forest.validate(),
        vec![DomainError::MultipleParents("B".into())]
    );
}

#[test]
fn given_parent_cycle_when_building_then_tolerated_and_reported() {
    // Arrange
    let categories = vec![
        Category::new("A", "a").with_parent("B"),
        Category::new("B", "b").with_parent("A"),
        Category::new("R", "root"),
    ];

    // Act
    let forest = build_forest(&categories);
    let issues = forest.validate();

    // Assert
    assert_eq!(root_ids(&forest), vec!["R"]);
    assert!(issues.contains(&DomainError::CycleDetected("A".into())));
    assert!(issues.contains(&DomainError::CycleDetected("B".into())));
}

#[test]
fn given_conflicting_parents_when_building_then_multiple_parents_reported() {
    // Arrange: C nested under A but declares B as its parent
    let categories = vec![
        Category::new("A", "a").with_children(vec![Category::new("C", "c").with_parent("B")]),
        Category::new("B", "b"),
    ];

    // Act
    let forest = build_forest(&categories);

    // Assert
    assert_eq!(
        forest.validate(),
        vec![DomainError::MultipleParents("C".into())]
    );
}

#[test]
fn given_forest_when_iterating_then_pre_order_over_all_roots() {
    let forest = build_forest(&flat_catalog());

    let order: Vec<String> = forest.iter().map(|(_, n)| n.data.id.clone()).collect();

    assert_eq!(order, vec!["A", "B", "E", "C", "D"]);
}

#[rstest]
#[case::single(vec![Category::new("A", "a")], vec!["A"])]
#[case::two_levels(
    vec![Category::new("A", "a"), Category::new("B", "b").with_parent("A")],
    vec!["A"]
)]
#[case::siblings(
    vec![
        Category::new("A", "a"),
        Category::new("B", "b"),
        Category::new("C", "c").with_parent("B"),
    ],
    vec!["A", "B"]
)]
#[case::deep_chain(
    vec![
        Category::new("D", "d").with_parent("C"),
        Category::new("C", "c").with_parent("B"),
        Category::new("B", "b").with_parent("A"),
        Category::new("A", "a"),
    ],
    vec!["A"]
)]
fn given_consistent_parent_links_when_building_then_roots_match_null_parents(
    #[case] categories: Vec<Category>,
    #[case] expected: Vec<&str>,
) {
    let forest = build_forest(&categories);
    assert_eq!(root_ids(&forest), expected);
}
