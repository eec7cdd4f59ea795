use super::*;

fn shape(p: &mut Pathway, id: &str, x: f64) {
    p.add(PathwayElement::new(ObjectType::Shape).with_id(id).at(x, 50.0).with_z(4)).unwrap();
}

fn ids(list: &[&str]) -> Vec<GraphId> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn group_ref(p: &Pathway, id: &str) -> Option<GraphId> {
    p.get(id).unwrap().group_ref.clone()
}

#[test]
fn ungrouped_selection_becomes_one_group() {
    let mut p = Pathway::with_seed(8);
    shape(&mut p, "a", 50.0);
    shape(&mut p, "b", 150.0);
    let GroupToggle::Grouped(g) = toggle_group(&mut p, &ids(&["a", "b"])).unwrap() else {
        panic!("expected a new group");
    };
    let group = p.get(&g).unwrap();
    assert_eq!(group.z_order, 3);
    let gid = group.group_id.clone();
    assert_eq!(group_ref(&p, "a"), gid);
    assert_eq!(group_ref(&p, "b"), gid);
}

#[test]
fn toggling_twice_dissolves() {
    let mut p = Pathway::with_seed(8);
    shape(&mut p, "a", 50.0);
    shape(&mut p, "b", 150.0);
    let GroupToggle::Grouped(g) = toggle_group(&mut p, &ids(&["a", "b"])).unwrap() else {
        panic!("expected a new group");
    };
    assert_eq!(toggle_group(&mut p, &[g.clone()]).unwrap(), GroupToggle::Ungrouped(vec![g.clone()]));
    assert!(!p.contains(&g));
    assert_eq!(group_ref(&p, "a"), None);
    assert_eq!(group_ref(&p, "b"), None);
}

#[test]
fn selecting_members_of_one_group_dissolves_it() {
    let mut p = Pathway::with_seed(8);
    shape(&mut p, "a", 50.0);
    shape(&mut p, "b", 150.0);
    let GroupToggle::Grouped(g) = toggle_group(&mut p, &ids(&["a", "b"])).unwrap() else {
        panic!("expected a new group");
    };
    assert_eq!(toggle_group(&mut p, &ids(&["a"])).unwrap(), GroupToggle::Ungrouped(vec![g]));
    assert_eq!(group_ref(&p, "b"), None);
}

#[test]
fn selected_group_is_merged_into_new_group() {
    let mut p = Pathway::with_seed(8);
    shape(&mut p, "a", 50.0);
    shape(&mut p, "b", 150.0);
    shape(&mut p, "c", 250.0);
    let GroupToggle::Grouped(old) = toggle_group(&mut p, &ids(&["a", "b"])).unwrap() else {
        panic!("expected a new group");
    };
    let GroupToggle::Grouped(new) = toggle_group(&mut p, &[old.clone(), "c".to_string()]).unwrap() else {
        panic!("expected a new group");
    };
    assert!(!p.contains(&old));
    let gid = p.get(&new).unwrap().group_id.clone().unwrap();
    let mut members = p.group_members(&gid);
    members.sort();
    assert_eq!(members, ids(&["a", "b", "c"]));
}

#[test]
fn nothing_groupable_is_unchanged() {
    let mut p = Pathway::with_seed(8);
    p.add(PathwayElement::new(ObjectType::Info).with_id("info")).unwrap();
    assert_eq!(toggle_group(&mut p, &ids(&["info", "missing"])).unwrap(), GroupToggle::Unchanged);
}
