use approx::assert_relative_eq;
use propedit_core::attributes::{keys, ContactConfig, TransistorKind};
use propedit_core::{
    EditError, EditorSettings, FieldEdit, InstanceStore, LayoutDatabase, NodeEditSession,
    NodeField, NodeFunction, NodeId, NodeInstance, NodeProto, Orientation, Point, SizeModel,
    VarValue,
};
use rstest::rstest;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn place(db: &mut LayoutDatabase, function: NodeFunction, x_size: f64, y_size: f64) -> NodeId {
    db.add_node(NodeInstance::new(
        "n1",
        NodeProto::new("proto", function),
        Point::new(0.0, 0.0),
        x_size,
        y_size,
    ))
}

fn open(db: &LayoutDatabase, id: &NodeId) -> NodeEditSession {
    NodeEditSession::load(db, id, EditorSettings::default()).unwrap()
}

#[test]
fn width_edit_produces_single_delta() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Plain, 10.0, 10.0);
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::XSize, "20".into()));

    let edit = session.build_edit(&db.instance(&id).unwrap());
    assert_eq!(edit.delta.dx, 0.0);
    assert_eq!(edit.delta.dy, 0.0);
    assert_eq!(edit.delta.d_width, 10.0);
    assert_eq!(edit.delta.d_height, 0.0);
    assert!(edit.delta.d_orient.is_identity());
    assert!(edit.attributes.is_empty());

    assert!(session.commit(&mut db).unwrap());
    let node = db.get_node(&id).unwrap();
    assert_eq!((node.x_size, node.y_size), (20.0, 10.0));
}

#[test]
fn second_commit_is_noop() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::MultiCut, 5.0, 5.0);
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::X, "3.5".into()));
    session.edit_field(FieldEdit::Text(NodeField::Primary, "2".into()));
    assert!(session.commit(&mut db).unwrap());

    let before = db.get_node(&id).cloned();
    assert!(!session.commit(&mut db).unwrap());
    assert_eq!(db.get_node(&id).cloned(), before);

    // a fresh session on the committed node is also a no-op
    let mut fresh = open(&db, &id);
    assert!(!fresh.commit(&mut db).unwrap());
}

#[test]
fn multi_cut_alignment_survives_reload() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::MultiCut, 5.0, 5.0);
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Choice(1));
    session.commit(&mut db).unwrap();
    assert_eq!(
        db.get_node(&id).unwrap().var(keys::CUT_ALIGNMENT),
        Some(&VarValue::Int(1))
    );
    assert_eq!(open(&db, &id).choice(), Some(1));
}

#[test]
fn multi_cut_default_spacing_removes_variable() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::MultiCut, 5.0, 5.0);
    db.get_node_mut(&id)
        .unwrap()
        .variables
        .insert(keys::CUT_SPACING.to_string(), VarValue::Double(3.0));

    let mut session = open(&db, &id);
    assert_eq!(session.text(NodeField::Primary), Some("3"));
    session.edit_field(FieldEdit::Text(NodeField::Primary, "DEFAULT".into()));
    session.commit(&mut db).unwrap();
    assert!(db.get_node(&id).unwrap().var(keys::CUT_SPACING).is_none());
    assert_eq!(session.text(NodeField::Primary), Some("DEFAULT"));
}

#[rstest]
#[case("1i", 1, true)]
#[case("2", 2, false)]
#[case("0", 0, false)]
#[case("2I", 2, true)]
fn contact_strings_decode(#[case] text: &str, #[case] count: u8, #[case] inset: bool) {
    assert_eq!(ContactConfig::decode(text), ContactConfig { count, inset });
}

#[test]
fn scalable_contacts_written_as_packed_string() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::ScalableTransistor, 6.0, 6.0);
    let mut session = open(&db, &id);
    let one_inset = ContactConfig {
        count: 1,
        inset: true,
    };
    session.edit_field(FieldEdit::Choice(one_inset.index()));
    session.commit(&mut db).unwrap();
    assert_eq!(
        db.get_node(&id).unwrap().var(keys::TRANS_CONTACTS),
        Some(&VarValue::Text("1i".into()))
    );
}

#[test]
fn out_of_range_contact_choice_is_ignored() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = db.add_node(
        NodeInstance::new(
            "n1",
            NodeProto::new("proto", NodeFunction::ScalableTransistor),
            Point::new(0.0, 0.0),
            6.0,
            6.0,
        )
        .with_var(keys::TRANS_CONTACTS, VarValue::Text("1i".into())),
    );
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Choice(9));
    assert_eq!(session.choice(), Some(3));
    assert!(!session.commit(&mut db).unwrap());
    assert_eq!(
        db.get_node(&id).unwrap().var(keys::TRANS_CONTACTS),
        Some(&VarValue::Text("1i".into()))
    );
}

#[rstest]
#[case("10.0")]
#[case("10.0000001")]
#[case(" 10")]
fn equivalent_retyped_size_commits_nothing(#[case] text: &str) {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Plain, 10.0, 10.0);
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::XSize, text.into()));
    session.edit_field(FieldEdit::Text(NodeField::X, "0.00".into()));
    assert!(!session.commit(&mut db).unwrap());
    assert!(!db.can_undo());
}

#[test]
fn rejected_commit_keeps_session_edits() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Plain, 4.0, 4.0);
    db.get_node_mut(&id).unwrap().locked = true;

    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::Y, "8".into()));
    let err = session.commit(&mut db).unwrap_err();
    assert!(matches!(err, EditError::Rejected { .. }));
    assert_eq!(session.text(NodeField::Y), Some("8"));
    assert!(session.is_changed());
    assert_eq!(db.get_node(&id).unwrap().anchor, Point::new(0.0, 0.0));
}

#[test]
fn unparsable_text_falls_back() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Plain, 4.0, 4.0);
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::XSize, "wide".into()));
    assert!(!session.commit(&mut db).unwrap());
}

#[test]
fn mirror_toggle_on_rotated_node() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Plain, 8.0, 2.0);
    db.get_node_mut(&id).unwrap().orientation = Orientation::rotation(900);

    let mut session = open(&db, &id);
    assert_eq!(session.text(NodeField::XSize), Some("2"));
    session.edit_field(FieldEdit::Flag(NodeField::MirrorX, true));
    session.commit(&mut db).unwrap();

    // the displayed X mirror of a quarter-turned node is its native Y mirror
    let node = db.get_node(&id).unwrap();
    assert_eq!(node.orientation, Orientation::from_parts(900, false, true));
    assert!(!session.is_changed());
    assert!(!session.commit(&mut db).unwrap());
}

#[test]
fn outline_rescaled_and_rotated() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(&mut db, NodeFunction::Artwork, 4.0, 2.0);
    db.get_node_mut(&id)
        .unwrap()
        .replace_outline(vec![Point::new(-2.0, -1.0), Point::new(2.0, 1.0)]);

    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::XSize, "8".into()));
    session.edit_field(FieldEdit::Text(NodeField::Rotation, "90".into()));
    let edit = session.build_edit(&db.instance(&id).unwrap());
    assert_eq!(edit.delta.d_width, 0.0);
    assert!(edit.delta.d_orient.is_identity());
    session.commit(&mut db).unwrap();

    let node = db.get_node(&id).unwrap();
    let outline = node.outline.as_ref().unwrap();
    assert_relative_eq!(outline[0].x, 1.0);
    assert_relative_eq!(outline[0].y, -4.0);
    assert_relative_eq!(outline[1].x, -1.0);
    assert_relative_eq!(outline[1].y, 4.0);
}

#[test]
fn scaled_transistor_box_follows_width() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let model = SizeModel::Scaled {
        x_offset: 3.0,
        y_offset: 2.0,
    };
    let id = place(
        &mut db,
        NodeFunction::Transistor {
            kind: TransistorKind::NMos,
            model,
        },
        6.0,
        4.0,
    );
    let mut session = open(&db, &id);
    assert_eq!(session.text(NodeField::XSize), Some("3"));
    session.edit_field(FieldEdit::Text(NodeField::XSize, "10".into()));
    session.commit(&mut db).unwrap();
    let node = db.get_node(&id).unwrap();
    assert_relative_eq!(node.x_size, 13.0);
    assert_relative_eq!(node.y_size, 4.0);
}

#[test]
fn schematic_transistor_sizes_are_annotations() {
    init_logging();
    let mut db = LayoutDatabase::new("lib");
    let id = place(
        &mut db,
        NodeFunction::Transistor {
            kind: TransistorKind::PMos,
            model: SizeModel::Schematic,
        },
        4.0,
        4.0,
    );
    let mut session = open(&db, &id);
    session.edit_field(FieldEdit::Text(NodeField::XSize, "12".into()));
    session.commit(&mut db).unwrap();
    let node = db.get_node(&id).unwrap();
    assert_eq!(node.x_size, 4.0);
    assert_eq!(node.var(keys::WIDTH), Some(&VarValue::Double(12.0)));
    assert!(db.undo());
    assert!(db.get_node(&id).unwrap().var(keys::WIDTH).is_none());
}
