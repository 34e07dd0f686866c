//! Specialized per-function attributes of node instances.
//!
//! Every node belongs to exactly one [`NodeFunction`], taken from its
//! prototype. A function decides which (at most two) text fields and which
//! selector a node exposes, how stored variables are shown in them, and how
//! edited text is written back as variable edits.

use serde::{Deserialize, Serialize};

use crate::diff::SettingsDiff;
use crate::node::{NodeInstance, VarValue};
use crate::settings::EditorSettings;
use crate::sizing::SizeModel;
use crate::text::{format_number, parse_number, parse_or};

/// Variable keys written by the attribute reconciler.
pub mod keys {
    pub const RESISTANCE: &str = "SCHEM_resistance";
    pub const CAPACITANCE: &str = "SCHEM_capacitance";
    pub const INDUCTANCE: &str = "SCHEM_inductance";
    pub const DIODE: &str = "SCHEM_diode";
    pub const FUNCTION: &str = "SCHEM_function";
    pub const GLOBAL_NAME: &str = "SCHEM_global_name";
    pub const WIDTH: &str = "ATTR_width";
    pub const LENGTH: &str = "ATTR_length";
    pub const AREA: &str = "ATTR_area";
    pub const TRANS_CONTACTS: &str = "MOCMOS_transcontacts";
    pub const CUT_SPACING: &str = "MOCMOS_cutspacing";
    pub const CUT_ALIGNMENT: &str = "MOCMOS_cutalignment";
    pub const TUBE_COUNT: &str = "CNT_count";
    pub const TUBE_PITCH: &str = "CNT_pitch";
    pub const ART_DEGREES: &str = "ART_degrees";
    pub const ART_COLOR: &str = "ART_color";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransistorKind {
    NMos,
    PMos,
    Npn,
    Pnp,
}

impl TransistorKind {
    pub fn is_bipolar(&self) -> bool {
        matches!(self, TransistorKind::Npn | TransistorKind::Pnp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransistorKind::NMos => "nMOS",
            TransistorKind::PMos => "pMOS",
            TransistorKind::Npn => "NPN",
            TransistorKind::Pnp => "PNP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResistorKind {
    Normal,
    Poly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacitorKind {
    Normal,
    Electrolytic,
}

/// Function category of a node prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeFunction {
    Plain,
    Transistor {
        kind: TransistorKind,
        model: SizeModel,
    },
    Resistor {
        kind: ResistorKind,
        model: Option<SizeModel>,
    },
    Capacitor {
        kind: CapacitorKind,
        model: Option<SizeModel>,
    },
    Inductor,
    Diode,
    MultiCut,
    NanotubeArray,
    ScalableTransistor,
    GlobalNet,
    BoundingBox,
    Circle,
    Artwork,
    TechEditorPrimitive {
        meaning: String,
    },
}

/// Where multi-cut contact cuts sit inside the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutAlignment {
    Centered = 0,
    EdgeAligned = 1,
    CornerAligned = 2,
}

impl CutAlignment {
    pub const ALL: [CutAlignment; 3] = [
        CutAlignment::Centered,
        CutAlignment::EdgeAligned,
        CutAlignment::CornerAligned,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            CutAlignment::Centered => "Centered",
            CutAlignment::EdgeAligned => "Edge-aligned",
            CutAlignment::CornerAligned => "Corner-aligned",
        }
    }
}

/// Contact arrangement of a scalable transistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactConfig {
    /// 0, 1 or 2 contacts.
    pub count: u8,
    /// Contacts pulled half a unit closer to the gate.
    pub inset: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            count: 2,
            inset: false,
        }
    }
}

impl ContactConfig {
    pub const CHOICES: [&'static str; 5] = [
        "Top & Bottom / normal spacing",
        "Top & Bottom / half-unit closer",
        "Only Bottom / normal spacing",
        "Only Bottom / half-unit closer",
        "None",
    ];

    /// `"<digit>[i]"`, e.g. `"1i"`.
    pub fn encode(&self) -> String {
        let mut s = self.count.to_string();
        if self.inset {
            s.push('i');
        }
        s
    }

    /// Lenient decode: the last contact digit wins, any `i` marks inset.
    pub fn decode(text: &str) -> Self {
        let mut config = Self::default();
        for c in text.chars() {
            match c {
                '0'..='2' => config.count = c as u8 - b'0',
                'i' | 'I' => config.inset = true,
                _ => {}
            }
        }
        config
    }

    pub fn index(&self) -> usize {
        let base = (2 - self.count.min(2) as usize) * 2;
        if self.inset && self.count > 0 {
            base + 1
        } else {
            base
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::CHOICES.len()).then(|| Self {
            count: 2 - (index / 2) as u8,
            inset: index & 1 != 0,
        })
    }
}

/// Electrical characteristic of a global net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortCharacteristic {
    Unknown,
    Input,
    Output,
    Bidirectional,
    Power,
    Ground,
    Clock,
    ClockPhase(u8),
    ReferenceOutput,
    ReferenceInput,
    ReferenceBase,
}

impl PortCharacteristic {
    /// Order in which characteristics are offered.
    pub const ORDERED: [PortCharacteristic; 16] = [
        PortCharacteristic::Unknown,
        PortCharacteristic::Input,
        PortCharacteristic::Output,
        PortCharacteristic::Bidirectional,
        PortCharacteristic::Power,
        PortCharacteristic::Ground,
        PortCharacteristic::Clock,
        PortCharacteristic::ClockPhase(1),
        PortCharacteristic::ClockPhase(2),
        PortCharacteristic::ClockPhase(3),
        PortCharacteristic::ClockPhase(4),
        PortCharacteristic::ClockPhase(5),
        PortCharacteristic::ClockPhase(6),
        PortCharacteristic::ReferenceOutput,
        PortCharacteristic::ReferenceInput,
        PortCharacteristic::ReferenceBase,
    ];

    pub fn bits(&self) -> u32 {
        match self {
            PortCharacteristic::Unknown => 0,
            PortCharacteristic::Clock => 1,
            PortCharacteristic::ClockPhase(n) => 1 + *n as u32,
            PortCharacteristic::Input => 8,
            PortCharacteristic::Output => 9,
            PortCharacteristic::Bidirectional => 10,
            PortCharacteristic::Power => 11,
            PortCharacteristic::Ground => 12,
            PortCharacteristic::ReferenceOutput => 15,
            PortCharacteristic::ReferenceInput => 16,
            PortCharacteristic::ReferenceBase => 17,
        }
    }

    pub fn from_bits(bits: u32) -> Self {
        Self::choices()
            .iter()
            .copied()
            .find(|c| c.bits() == bits)
            .unwrap_or(PortCharacteristic::Unknown)
    }

    /// The distinct characteristics, in display order.
    pub fn choices() -> &'static [PortCharacteristic] {
        &Self::ORDERED
    }

    pub fn name(&self) -> String {
        match self {
            PortCharacteristic::Unknown => "Unknown".to_string(),
            PortCharacteristic::Input => "Input".to_string(),
            PortCharacteristic::Output => "Output".to_string(),
            PortCharacteristic::Bidirectional => "Bidirectional".to_string(),
            PortCharacteristic::Power => "Power".to_string(),
            PortCharacteristic::Ground => "Ground".to_string(),
            PortCharacteristic::Clock => "Clock".to_string(),
            PortCharacteristic::ClockPhase(n) => format!("Clock Phase {n}"),
            PortCharacteristic::ReferenceOutput => "Reference Output".to_string(),
            PortCharacteristic::ReferenceInput => "Reference Input".to_string(),
            PortCharacteristic::ReferenceBase => "Reference Base".to_string(),
        }
    }
}

/// Colors offered for artwork primitives; the index is the stored code.
pub const ART_COLORS: [&str; 10] = [
    "Black", "White", "Red", "Green", "Blue", "Cyan", "Magenta", "Yellow", "Gray", "Orange",
];

/// A labelled free-text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    pub label: String,
    pub value: String,
}

impl TextField {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// A labelled enumerated selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub label: String,
    pub choices: Vec<String>,
    pub index: usize,
    /// Informational selectors show a single fixed entry.
    pub editable: bool,
}

impl Selector {
    fn new(label: &str, choices: Vec<String>, index: usize) -> Self {
        Self {
            label: label.to_string(),
            choices,
            index,
            editable: true,
        }
    }

    fn fixed(label: &str, entry: String) -> Self {
        Self {
            label: label.to_string(),
            choices: vec![entry],
            index: 0,
            editable: false,
        }
    }
}

/// The special fields a node function exposes, as loaded from the node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialFields {
    pub primary: Option<TextField>,
    pub secondary: Option<TextField>,
    pub selector: Option<Selector>,
}

/// The special fields of an edit session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecialEdits {
    pub primary: Option<SettingsDiff<String>>,
    pub secondary: Option<SettingsDiff<String>>,
    pub selector: Option<SettingsDiff<usize>>,
}

impl SpecialEdits {
    pub fn from_fields(fields: &SpecialFields) -> Self {
        Self {
            primary: fields.primary.as_ref().map(|f| SettingsDiff::new(f.value.clone())),
            secondary: fields.secondary.as_ref().map(|f| SettingsDiff::new(f.value.clone())),
            selector: fields.selector.as_ref().map(|s| SettingsDiff::new(s.index)),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.primary.as_ref().is_some_and(SettingsDiff::is_changed)
            || self.secondary.as_ref().is_some_and(SettingsDiff::is_changed)
            || self.selector.as_ref().is_some_and(SettingsDiff::is_changed)
    }

    fn changed_primary(&self) -> Option<&str> {
        changed_text(self.primary.as_ref())
    }

    fn changed_secondary(&self) -> Option<&str> {
        changed_text(self.secondary.as_ref())
    }

    fn changed_selector(&self) -> Option<usize> {
        self.selector
            .as_ref()
            .filter(|s| s.is_changed())
            .map(|s| *s.current())
    }
}

fn changed_text(field: Option<&SettingsDiff<String>>) -> Option<&str> {
    field.filter(|f| f.is_changed()).map(|f| f.current().as_str())
}

/// One change to a node's keyed variables or technology bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeEdit {
    Set { key: String, value: VarValue },
    Delete { key: String },
    TechBits(u32),
}

impl AttributeEdit {
    pub fn set(key: &str, value: VarValue) -> Self {
        AttributeEdit::Set {
            key: key.to_string(),
            value,
        }
    }

    pub fn delete(key: &str) -> Self {
        AttributeEdit::Delete {
            key: key.to_string(),
        }
    }
}

impl NodeFunction {
    /// Engineering size model whose sizing rule overrides raw size fields.
    pub fn size_model(&self) -> Option<&SizeModel> {
        match self {
            NodeFunction::Transistor { model, .. } => Some(model),
            NodeFunction::Resistor { model, .. } | NodeFunction::Capacitor { model, .. } => {
                model.as_ref()
            }
            _ => None,
        }
    }

    /// Present the node's stored attributes as special fields.
    pub fn load(&self, node: &NodeInstance, settings: &EditorSettings) -> SpecialFields {
        match self {
            NodeFunction::Plain => SpecialFields::default(),
            NodeFunction::Transistor { kind, .. } => load_transistor(*kind, node),
            NodeFunction::Resistor { kind, .. } => {
                let label = match kind {
                    ResistorKind::Normal => "Resistance:",
                    ResistorKind::Poly => "Poly resistance:",
                };
                load_value(label, keys::RESISTANCE, node)
            }
            NodeFunction::Capacitor { kind, .. } => {
                let label = match kind {
                    CapacitorKind::Normal => "Capacitance:",
                    CapacitorKind::Electrolytic => "Electrolytic cap:",
                };
                load_value(label, keys::CAPACITANCE, node)
            }
            NodeFunction::Inductor => load_value("Inductance:", keys::INDUCTANCE, node),
            NodeFunction::Diode => load_value("Diode size:", keys::DIODE, node),
            NodeFunction::BoundingBox => load_value("Function:", keys::FUNCTION, node),
            NodeFunction::MultiCut => load_multi_cut(node, settings),
            NodeFunction::NanotubeArray => load_nanotubes(node, settings),
            NodeFunction::ScalableTransistor => load_scalable(node),
            NodeFunction::GlobalNet => load_global(node),
            NodeFunction::Circle => load_circle(node),
            NodeFunction::Artwork => load_artwork(node),
            NodeFunction::TechEditorPrimitive { meaning } => SpecialFields {
                selector: Some(Selector::fixed("Tech. editor:", meaning.clone())),
                ..SpecialFields::default()
            },
        }
    }

    /// Turn edited special fields into variable edits. Unchanged fields
    /// produce nothing.
    pub fn reconcile(
        &self,
        edits: &SpecialEdits,
        node: &NodeInstance,
        settings: &EditorSettings,
    ) -> Vec<AttributeEdit> {
        let out = match self {
            NodeFunction::Plain | NodeFunction::TechEditorPrimitive { .. } => Vec::new(),
            NodeFunction::Transistor { kind, .. } => {
                if kind.is_bipolar() {
                    text_edit(keys::AREA, edits.changed_primary(), node, settings)
                        .into_iter()
                        .collect()
                } else {
                    Vec::new()
                }
            }
            NodeFunction::Resistor { .. } => {
                text_edit(keys::RESISTANCE, edits.changed_primary(), node, settings)
                    .into_iter()
                    .collect()
            }
            NodeFunction::Capacitor { .. } => {
                text_edit(keys::CAPACITANCE, edits.changed_primary(), node, settings)
                    .into_iter()
                    .collect()
            }
            NodeFunction::Inductor => {
                text_edit(keys::INDUCTANCE, edits.changed_primary(), node, settings)
                    .into_iter()
                    .collect()
            }
            NodeFunction::Diode => text_edit(keys::DIODE, edits.changed_primary(), node, settings)
                .into_iter()
                .collect(),
            NodeFunction::BoundingBox => {
                text_edit(keys::FUNCTION, edits.changed_primary(), node, settings)
                    .into_iter()
                    .collect()
            }
            NodeFunction::MultiCut => reconcile_multi_cut(edits, node, settings),
            NodeFunction::NanotubeArray => reconcile_nanotubes(edits, node, settings),
            NodeFunction::ScalableTransistor => reconcile_scalable(edits, node, settings),
            NodeFunction::GlobalNet => reconcile_global(edits, node, settings),
            NodeFunction::Circle => reconcile_circle(edits, node, settings),
            NodeFunction::Artwork => reconcile_artwork(edits, node),
        };
        if !out.is_empty() {
            log::debug!("node {}: {} attribute edit(s)", node.name, out.len());
        }
        out
    }
}

// ── shared encoders ──────────────────────────────────────────────────

fn var_text(node: &NodeInstance, key: &str) -> String {
    node.var(key).map(VarValue::to_text).unwrap_or_default()
}

fn var_text_or_sentinel(node: &NodeInstance, key: &str, settings: &EditorSettings) -> String {
    node.var(key)
        .map(VarValue::to_text)
        .unwrap_or_else(|| settings.default_sentinel.clone())
}

fn delete_if_present(key: &str, node: &NodeInstance) -> Option<AttributeEdit> {
    node.var(key).map(|_| AttributeEdit::delete(key))
}

/// Free text stored verbatim.
fn text_edit(
    key: &str,
    text: Option<&str>,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Option<AttributeEdit> {
    let text = text?.trim();
    if settings.is_default_text(text) {
        return delete_if_present(key, node);
    }
    Some(AttributeEdit::set(key, VarValue::Text(text.to_string())))
}

/// Numeric text stored as a double; unparsable text keeps the stored value.
fn double_edit(
    key: &str,
    text: Option<&str>,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Option<AttributeEdit> {
    let text = text?;
    if settings.is_default_text(text) {
        return delete_if_present(key, node);
    }
    match parse_number(text) {
        Some(v) => Some(AttributeEdit::set(key, VarValue::Double(v))),
        None => {
            log::debug!("{key}: ignoring unparsable {text:?}");
            None
        }
    }
}

/// Numeric text stored as an integer; unparsable text keeps the stored value.
fn int_edit(
    key: &str,
    text: Option<&str>,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Option<AttributeEdit> {
    let text = text?;
    if settings.is_default_text(text) {
        return delete_if_present(key, node);
    }
    match parse_number(text) {
        Some(v) => Some(AttributeEdit::set(key, VarValue::Int(v.round() as i64))),
        None => {
            log::debug!("{key}: ignoring unparsable {text:?}");
            None
        }
    }
}

fn load_value(label: &str, key: &str, node: &NodeInstance) -> SpecialFields {
    SpecialFields {
        primary: Some(TextField::new(label, var_text(node, key))),
        ..SpecialFields::default()
    }
}

// ── transistors ──────────────────────────────────────────────────────

fn load_transistor(kind: TransistorKind, node: &NodeInstance) -> SpecialFields {
    let primary = kind
        .is_bipolar()
        .then(|| TextField::new("Area:", var_text(node, keys::AREA)));
    SpecialFields {
        primary,
        secondary: None,
        selector: Some(Selector::fixed("Transistor type:", kind.name().to_string())),
    }
}

fn load_scalable(node: &NodeInstance) -> SpecialFields {
    let config = node
        .var(keys::TRANS_CONTACTS)
        .map(|v| ContactConfig::decode(&v.to_text()))
        .unwrap_or_default();
    let width = node
        .var_f64(keys::WIDTH)
        .unwrap_or_else(|| node.visible_size().0);
    SpecialFields {
        primary: Some(TextField::new("Width:", format_number(width))),
        secondary: None,
        selector: Some(Selector::new(
            "Contacts:",
            ContactConfig::CHOICES.iter().map(|s| s.to_string()).collect(),
            config.index(),
        )),
    }
}

fn reconcile_scalable(
    edits: &SpecialEdits,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Vec<AttributeEdit> {
    let mut out = Vec::new();
    if let Some(index) = edits.changed_selector() {
        match ContactConfig::from_index(index) {
            Some(config) => out.push(AttributeEdit::set(
                keys::TRANS_CONTACTS,
                VarValue::Text(config.encode()),
            )),
            None => log::debug!("contact choice {index} out of range"),
        }
    }
    out.extend(double_edit(keys::WIDTH, edits.changed_primary(), node, settings));
    out
}

// ── multi-cut contacts and nanotube arrays ───────────────────────────

fn load_multi_cut(node: &NodeInstance, settings: &EditorSettings) -> SpecialFields {
    let alignment = node
        .var(keys::CUT_ALIGNMENT)
        .and_then(VarValue::as_i64)
        .and_then(|i| CutAlignment::from_index(i.max(0) as usize))
        .unwrap_or(CutAlignment::Centered);
    SpecialFields {
        primary: Some(TextField::new(
            "Cut spacing:",
            var_text_or_sentinel(node, keys::CUT_SPACING, settings),
        )),
        secondary: None,
        selector: Some(Selector::new(
            "Cut alignment:",
            CutAlignment::ALL.iter().map(|a| a.name().to_string()).collect(),
            alignment as usize,
        )),
    }
}

fn reconcile_multi_cut(
    edits: &SpecialEdits,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Vec<AttributeEdit> {
    let mut out: Vec<AttributeEdit> =
        double_edit(keys::CUT_SPACING, edits.changed_primary(), node, settings)
            .into_iter()
            .collect();
    if let Some(index) = edits.changed_selector() {
        match CutAlignment::from_index(index) {
            // centered is implicit
            Some(CutAlignment::Centered) => {
                out.extend(delete_if_present(keys::CUT_ALIGNMENT, node));
            }
            Some(alignment) => out.push(AttributeEdit::set(
                keys::CUT_ALIGNMENT,
                VarValue::Int(alignment as i64),
            )),
            None => log::debug!("cut alignment index {index} out of range"),
        }
    }
    out
}

fn load_nanotubes(node: &NodeInstance, settings: &EditorSettings) -> SpecialFields {
    SpecialFields {
        primary: Some(TextField::new(
            "Number of tubes:",
            var_text_or_sentinel(node, keys::TUBE_COUNT, settings),
        )),
        secondary: Some(TextField::new(
            "Tube pitch:",
            var_text_or_sentinel(node, keys::TUBE_PITCH, settings),
        )),
        selector: None,
    }
}

fn reconcile_nanotubes(
    edits: &SpecialEdits,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Vec<AttributeEdit> {
    int_edit(keys::TUBE_COUNT, edits.changed_primary(), node, settings)
        .into_iter()
        .chain(double_edit(
            keys::TUBE_PITCH,
            edits.changed_secondary(),
            node,
            settings,
        ))
        .collect()
}

// ── global nets ──────────────────────────────────────────────────────

fn load_global(node: &NodeInstance) -> SpecialFields {
    let current = PortCharacteristic::from_bits(node.tech_bits);
    let choices = PortCharacteristic::choices();
    let index = choices.iter().position(|c| *c == current).unwrap_or(0);
    SpecialFields {
        primary: Some(TextField::new("Global name:", var_text(node, keys::GLOBAL_NAME))),
        secondary: None,
        selector: Some(Selector::new(
            "Characteristics:",
            choices.iter().map(PortCharacteristic::name).collect(),
            index,
        )),
    }
}

fn reconcile_global(
    edits: &SpecialEdits,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Vec<AttributeEdit> {
    let mut out: Vec<AttributeEdit> =
        text_edit(keys::GLOBAL_NAME, edits.changed_primary(), node, settings)
            .into_iter()
            .collect();
    if let Some(index) = edits.changed_selector() {
        match PortCharacteristic::choices().get(index) {
            Some(ch) => out.push(AttributeEdit::TechBits(ch.bits())),
            None => log::debug!("characteristic index {index} out of range"),
        }
    }
    out
}

// ── artwork ──────────────────────────────────────────────────────────

/// Stored arc as (start, extent) in degrees; a missing variable is a full circle.
fn circle_degrees(node: &NodeInstance) -> (f64, f64) {
    match node.var(keys::ART_DEGREES) {
        Some(VarValue::Doubles(v)) if v.len() >= 2 => (v[0].to_degrees(), v[1].to_degrees()),
        Some(other) => (0.0, other.as_f64().unwrap_or(0.0).to_degrees()),
        None => (0.0, 0.0),
    }
}

fn load_circle(node: &NodeInstance) -> SpecialFields {
    let (start, extent) = circle_degrees(node);
    let start = (start * 1000.0).round() / 1000.0;
    let extent = (extent * 1000.0).round() / 1000.0;
    let field = if start != 0.0 {
        TextField::new(
            "Offset angle / Degrees of circle:",
            format!("{} / {}", format_number(start), format_number(extent)),
        )
    } else if extent == 0.0 {
        TextField::new("Degrees of circle:", "360".to_string())
    } else {
        TextField::new("Degrees of circle:", format_number(extent))
    };
    SpecialFields {
        primary: Some(field),
        ..SpecialFields::default()
    }
}

fn reconcile_circle(
    edits: &SpecialEdits,
    node: &NodeInstance,
    settings: &EditorSettings,
) -> Vec<AttributeEdit> {
    let Some(text) = edits.changed_primary() else {
        return Vec::new();
    };
    if settings.is_default_text(text) {
        return delete_if_present(keys::ART_DEGREES, node).into_iter().collect();
    }

    let (old_start, old_extent) = circle_degrees(node);
    let old_extent = if old_extent == 0.0 { 360.0 } else { old_extent };
    let (start, extent) = match text.split_once('/') {
        Some((s, e)) => (
            parse_or(s, old_start),
            parse_or(e, old_extent),
        ),
        None => (0.0, parse_or(text, old_extent)),
    };

    let full_circle = settings.nearly_equal(extent, 0.0) || settings.nearly_equal(extent, 360.0);
    if settings.nearly_equal(start, 0.0) && full_circle {
        return delete_if_present(keys::ART_DEGREES, node).into_iter().collect();
    }
    vec![AttributeEdit::set(
        keys::ART_DEGREES,
        VarValue::Doubles(vec![start.to_radians(), extent.to_radians()]),
    )]
}

fn load_artwork(node: &NodeInstance) -> SpecialFields {
    let index = node
        .var(keys::ART_COLOR)
        .and_then(VarValue::as_i64)
        .filter(|i| (0..ART_COLORS.len() as i64).contains(i))
        .unwrap_or(0) as usize;
    SpecialFields {
        selector: Some(Selector::new(
            "Color:",
            ART_COLORS.iter().map(|s| s.to_string()).collect(),
            index,
        )),
        ..SpecialFields::default()
    }
}

fn reconcile_artwork(edits: &SpecialEdits, node: &NodeInstance) -> Vec<AttributeEdit> {
    match edits.changed_selector() {
        // black is the factory color
        Some(0) => delete_if_present(keys::ART_COLOR, node).into_iter().collect(),
        Some(index) if index < ART_COLORS.len() => {
            vec![AttributeEdit::set(keys::ART_COLOR, VarValue::Int(index as i64))]
        }
        _ => Vec::new(),
    }
}
