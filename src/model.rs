//! Document model: pathway elements, their properties, and the in-memory store.
//!
//! This module defines the data the canvas mirrors (`PathwayElement`,
//! `ObjectType`, line points and anchors) and the runtime store that owns all
//! live elements (`Pathway`). The store keeps three indexes consistent on every
//! mutation: the set of taken ids, the referrer index (which line endpoints
//! are attached to which element or anchor), and the anchor-to-line map.
//!
//! Change notification is pull based. Each subscriber owns a queue; every
//! mutation appends an event to all queues and subscribers drain them at their
//! own sync points.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::connector;
use crate::error::ModelError;
use crate::frame;

/// Pathway-unique identifier shared by elements, groups, line points and anchors.
pub type GraphId = String;

/// The kind of a pathway element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    DataNode,
    /// Small badge attached to a data node.
    State,
    Label,
    #[default]
    Shape,
    Group,
    /// Interaction between two elements.
    Line,
    /// Purely graphical line.
    GraphLine,
    /// Pathway-level metadata shown in the info box.
    Info,
    /// Container of literature references.
    Biopax,
}

impl ObjectType {
    #[must_use]
    pub fn is_shaped(self) -> bool {
        matches!(self, Self::DataNode | Self::State | Self::Label | Self::Shape)
    }

    #[must_use]
    pub fn is_line(self) -> bool {
        matches!(self, Self::Line | Self::GraphLine)
    }

    /// Whether line endpoints may attach to elements of this kind.
    #[must_use]
    pub fn is_linkable(self) -> bool {
        self.is_shaped() || self == Self::Group
    }
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Outline shape of a shaped element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    #[default]
    Rectangle,
    RoundedRectangle,
    Oval,
    Triangle,
    Hexagon,
    Octagon,
    Brace,
    /// Fixed-size degradation glyph.
    Degradation,
    /// No drawn border; the element is still a rectangle for hit-testing.
    None,
}

impl ShapeType {
    #[must_use]
    pub fn is_resizeable(self) -> bool {
        !matches!(self, Self::Degradation)
    }

    #[must_use]
    pub fn is_rotatable(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataNodeType {
    #[default]
    GeneProduct,
    Protein,
    Rna,
    Metabolite,
    Pathway,
    Complex,
    /// Stands in for a group elsewhere in the diagram (see `alias_ref`).
    Alias,
    Unknown,
}

/// Visual style of a group, also the key into the group painter registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStyle {
    #[default]
    None,
    Group,
    Complex,
    Pathway,
}

impl GroupStyle {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Group => "Group",
            Self::Complex => "Complex",
            Self::Pathway => "Pathway",
        }
    }

    /// Space between the union of member bounds and the drawn group box.
    #[must_use]
    pub fn margin(self) -> f64 {
        match self {
            Self::Complex => 12.0,
            Self::None | Self::Group | Self::Pathway => 8.0,
        }
    }
}

/// Routing strategy for a line's drawn path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorType {
    #[default]
    Straight,
    Elbow,
    Curved,
    /// Polyline through the user-placed waypoints.
    Segmented,
}

impl ConnectorType {
    /// Whether waypoints between the endpoints shape the route.
    #[must_use]
    pub fn uses_waypoints(self) -> bool {
        matches!(self, Self::Curved | Self::Segmented)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowHead {
    #[default]
    None,
    Arrow,
    TBar,
}

/// Which end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnd {
    Start,
    End,
}

/// A point on a line. Endpoints may be attached to a linkable element or an anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    #[serde(default)]
    pub id: GraphId,
    /// Free position, or the last resolved position when attached.
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_ref: Option<GraphId>,
    /// Position relative to the target's frame, each axis in `[-1, 1]`.
    #[serde(default)]
    pub rel_x: f64,
    #[serde(default)]
    pub rel_y: f64,
}

impl LinePoint {
    #[must_use]
    pub fn free(x: f64, y: f64) -> Self {
        Self { id: GraphId::new(), x, y, graph_ref: None, rel_x: 0.0, rel_y: 0.0 }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.graph_ref.is_some()
    }
}

/// A linkable point at a fractional position along a line's path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnchor {
    #[serde(default)]
    pub id: GraphId,
    /// Arc-length fraction in `[0, 1]`.
    pub position: f64,
}

/// A literature reference held by the biopax container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: GraphId,
    #[serde(default)]
    pub title: String,
}

/// One element of a pathway document.
///
/// Shaped elements are positioned by their center; states are positioned
/// relative to their parent data node (`rel_x`, `rel_y` in `[-1, 1]`); lines
/// by their points. Groups have no stored geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathwayElement {
    pub object_type: ObjectType,
    pub graph_id: GraphId,
    /// Id members refer to, for groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GraphId>,
    /// Group this element belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ref: Option<GraphId>,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, clockwise.
    pub rotation: f64,
    pub z_order: i64,
    pub text_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub color: Color,
    /// `None` means transparent.
    pub fill_color: Option<Color>,
    pub line_style: LineStyle,
    pub line_thickness: f64,
    pub shape_type: ShapeType,
    pub font_size: f64,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub data_node_type: DataNodeType,
    /// Group this alias data node stands in for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_ref: Option<GraphId>,
    pub group_style: GroupStyle,
    /// Parent data node, for states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<GraphId>,
    pub rel_x: f64,
    pub rel_y: f64,
    /// Start, waypoints, end.
    pub points: Vec<LinePoint>,
    pub anchors: Vec<LineAnchor>,
    pub connector_type: ConnectorType,
    pub start_arrow: ArrowHead,
    pub end_arrow: ArrowHead,
    pub citation_refs: Vec<GraphId>,
    pub citations: Vec<Citation>,
    pub properties: BTreeMap<String, String>,
}

impl Default for PathwayElement {
    fn default() -> Self {
        Self::new(ObjectType::Shape)
    }
}

impl PathwayElement {
    /// A new element with the usual defaults for its kind and no id yet.
    #[must_use]
    pub fn new(object_type: ObjectType) -> Self {
        let (width, height) = match object_type {
            ObjectType::DataNode | ObjectType::Label => (90.0, 25.0),
            ObjectType::Shape => (30.0, 30.0),
            ObjectType::State => (15.0, 15.0),
            _ => (0.0, 0.0),
        };
        let fill_color = match object_type {
            ObjectType::DataNode | ObjectType::State => Some(Color::WHITE),
            _ => None,
        };
        let shape_type = match object_type {
            ObjectType::Label => ShapeType::None,
            ObjectType::State => ShapeType::Oval,
            _ => ShapeType::Rectangle,
        };
        let points = if object_type.is_line() {
            vec![LinePoint::free(0.0, 0.0), LinePoint::free(0.0, 0.0)]
        } else {
            Vec::new()
        };
        Self {
            object_type,
            graph_id: GraphId::new(),
            group_id: None,
            group_ref: None,
            center_x: 0.0,
            center_y: 0.0,
            width,
            height,
            rotation: 0.0,
            z_order: 0,
            text_label: String::new(),
            href: None,
            color: Color::BLACK,
            fill_color,
            line_style: LineStyle::Solid,
            line_thickness: 1.0,
            shape_type,
            font_size: 12.0,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            data_node_type: DataNodeType::GeneProduct,
            alias_ref: None,
            group_style: GroupStyle::None,
            parent_ref: None,
            rel_x: 0.0,
            rel_y: 0.0,
            points,
            anchors: Vec::new(),
            connector_type: ConnectorType::Straight,
            start_arrow: ArrowHead::None,
            end_arrow: ArrowHead::None,
            citation_refs: Vec::new(),
            citations: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// A free line from `start` to `end`.
    #[must_use]
    pub fn line(start: Point, end: Point) -> Self {
        let mut e = Self::new(ObjectType::Line);
        e.points = vec![LinePoint::free(start.x, start.y), LinePoint::free(end.x, end.y)];
        e
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.graph_id = id.to_string();
        self
    }

    #[must_use]
    pub fn at(mut self, center_x: f64, center_y: f64) -> Self {
        self.center_x = center_x;
        self.center_y = center_y;
        self
    }

    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.text_label = label.to_string();
        self
    }

    #[must_use]
    pub fn with_z(mut self, z: i64) -> Self {
        self.z_order = z;
        self
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    #[must_use]
    pub fn point(&self, end: LineEnd) -> Option<&LinePoint> {
        match end {
            LineEnd::Start => self.points.first(),
            LineEnd::End if self.points.len() > 1 => self.points.last(),
            LineEnd::End => None,
        }
    }

    pub fn point_mut(&mut self, end: LineEnd) -> Option<&mut LinePoint> {
        match end {
            LineEnd::Start => self.points.first_mut(),
            LineEnd::End if self.points.len() > 1 => self.points.last_mut(),
            LineEnd::End => None,
        }
    }

    /// Points strictly between the endpoints.
    #[must_use]
    pub fn waypoints(&self) -> &[LinePoint] {
        if self.points.len() > 2 { &self.points[1..self.points.len() - 1] } else { &[] }
    }

    /// Whether the fill is absent or fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.fill_color.is_none_or(Color::is_transparent)
    }

    /// Every id this element owns: graph id, group id, point ids and anchor ids.
    #[must_use]
    pub fn owned_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.graph_id.as_str()];
        if let Some(gid) = &self.group_id {
            ids.push(gid);
        }
        ids.extend(self.points.iter().map(|p| p.id.as_str()));
        ids.extend(self.anchors.iter().map(|a| a.id.as_str()));
        ids.retain(|id| !id.is_empty());
        ids
    }
}

// =============================================================
// Events
// =============================================================

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathwayEvent {
    Added(GraphId),
    Deleted(GraphId),
    Modified(GraphId),
    /// The pathway's extent grew.
    Resized,
}

/// Handle returned by [`Pathway::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// A line endpoint that references some element or anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointRef {
    pub line: GraphId,
    pub end: LineEnd,
}

/// Something a line endpoint can be attached to.
#[derive(Debug, Clone, Copy)]
pub enum LinkTarget<'a> {
    Element(&'a PathwayElement),
    Anchor { line: &'a PathwayElement, anchor: &'a LineAnchor },
}

/// Full copy of a pathway's elements, used for undo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub elements: Vec<PathwayElement>,
}

// =============================================================
// Pathway
// =============================================================

/// In-memory pathway document.
#[derive(Debug)]
pub struct Pathway {
    elements: HashMap<GraphId, PathwayElement>,
    order: Vec<GraphId>,
    ids: HashSet<GraphId>,
    referrers: HashMap<GraphId, BTreeSet<PointRef>>,
    anchor_owner: HashMap<GraphId, GraphId>,
    listeners: Vec<Option<Vec<PathwayEvent>>>,
    changed: bool,
    extent: (f64, f64),
    rng: StdRng,
}

impl Default for Pathway {
    fn default() -> Self {
        Self::new()
    }
}

impl Pathway {
    /// Create an empty pathway seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create an empty pathway with deterministic id generation.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            ids: HashSet::new(),
            referrers: HashMap::new(),
            anchor_owner: HashMap::new(),
            listeners: Vec::new(),
            changed: false,
            extent: (0.0, 0.0),
            rng,
        }
    }

    // --- Listeners ---

    /// Register a new subscriber. Events raised from now on queue up for it.
    pub fn subscribe(&mut self) -> ListenerId {
        self.listeners.push(Some(Vec::new()));
        ListenerId(self.listeners.len() - 1)
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) {
        if let Some(slot) = self.listeners.get_mut(listener.0) {
            *slot = None;
        }
    }

    /// Take every event queued for `listener` since its last drain.
    pub fn drain_events(&mut self, listener: ListenerId) -> Vec<PathwayEvent> {
        match self.listeners.get_mut(listener.0) {
            Some(Some(queue)) => std::mem::take(queue),
            _ => Vec::new(),
        }
    }

    fn emit(&mut self, event: PathwayEvent) {
        for queue in self.listeners.iter_mut().flatten() {
            queue.push(event.clone());
        }
    }

    // --- Changed flag ---

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    // --- Ids ---

    #[must_use]
    pub fn is_id_taken(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// A fresh id not used anywhere in the pathway.
    pub fn unique_id(&mut self) -> GraphId {
        self.unique_id_excluding(&HashSet::new())
    }

    /// A fresh id not used in the pathway nor present in `reserved`.
    pub fn unique_id_excluding(&mut self, reserved: &HashSet<GraphId>) -> GraphId {
        loop {
            let candidate = format!("id{:08x}", self.rng.random::<u32>());
            if !self.ids.contains(&candidate) && !reserved.contains(&candidate) {
                return candidate;
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PathwayElement> {
        self.elements.get(id)
    }

    /// Look up an element, failing with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this graph id.
    pub fn require(&self, id: &str) -> Result<&PathwayElement, ModelError> {
        self.elements.get(id).ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &PathwayElement> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn first_of(&self, object_type: ObjectType) -> Option<&PathwayElement> {
        self.elements().find(|e| e.object_type == object_type)
    }

    #[must_use]
    pub fn info(&self) -> Option<&PathwayElement> {
        self.first_of(ObjectType::Info)
    }

    #[must_use]
    pub fn biopax(&self) -> Option<&PathwayElement> {
        self.first_of(ObjectType::Biopax)
    }

    /// Resolve an id to an element or an anchor on some line.
    #[must_use]
    pub fn link_target(&self, id: &str) -> Option<LinkTarget<'_>> {
        if let Some(e) = self.elements.get(id) {
            return Some(LinkTarget::Element(e));
        }
        let line = self.elements.get(self.anchor_owner.get(id)?)?;
        let anchor = line.anchors.iter().find(|a| a.id == id)?;
        Some(LinkTarget::Anchor { line, anchor })
    }

    /// The line owning anchor `anchor_id`.
    #[must_use]
    pub fn anchor_line(&self, anchor_id: &str) -> Option<&PathwayElement> {
        self.elements.get(self.anchor_owner.get(anchor_id)?)
    }

    /// Line endpoints attached to `target` (an element graph id or anchor id).
    #[must_use]
    pub fn referrers(&self, target: &str) -> Vec<PointRef> {
        self.referrers.get(target).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    /// The group element whose `group_id` is `group_id`.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&PathwayElement> {
        self.elements().find(|e| e.object_type == ObjectType::Group && e.group_id.as_deref() == Some(group_id))
    }

    /// The group an element directly belongs to.
    #[must_use]
    pub fn parent_group(&self, element: &PathwayElement) -> Option<&PathwayElement> {
        self.group(element.group_ref.as_deref()?)
    }

    /// Graph ids of the direct members of a group.
    #[must_use]
    pub fn group_members(&self, group_id: &str) -> Vec<GraphId> {
        self.elements()
            .filter(|e| e.group_ref.as_deref() == Some(group_id))
            .map(|e| e.graph_id.clone())
            .collect()
    }

    /// Members of a group and of every group nested in it, depth first.
    /// Nested group elements are included along with their members.
    #[must_use]
    pub fn group_members_deep(&self, group_id: &str) -> Vec<GraphId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_members(group_id, &mut visited, &mut out);
        out
    }

    fn collect_members(&self, group_id: &str, visited: &mut HashSet<GraphId>, out: &mut Vec<GraphId>) {
        if !visited.insert(group_id.to_string()) {
            return;
        }
        for member in self.group_members(group_id) {
            let nested = self.get(&member).and_then(|m| m.group_id.clone());
            out.push(member);
            if let Some(gid) = nested {
                self.collect_members(&gid, visited, out);
            }
        }
    }

    /// Alias data nodes standing in for a group.
    #[must_use]
    pub fn aliases_of(&self, group_id: &str) -> Vec<GraphId> {
        self.elements()
            .filter(|e| e.alias_ref.as_deref() == Some(group_id))
            .map(|e| e.graph_id.clone())
            .collect()
    }

    /// States attached to a data node.
    #[must_use]
    pub fn states_of(&self, id: &str) -> Vec<GraphId> {
        self.elements()
            .filter(|e| e.object_type == ObjectType::State && e.parent_ref.as_deref() == Some(id))
            .map(|e| e.graph_id.clone())
            .collect()
    }

    /// Largest right and bottom coordinates seen so far.
    #[must_use]
    pub fn extent(&self) -> (f64, f64) {
        self.extent
    }

    // --- Mutation ---

    /// Add an element, generating any missing ids.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if any id the element carries is already taken,
    /// `Singleton` for a second info or biopax element, and `MissingParent`
    /// for a state whose parent is absent.
    pub fn add(&mut self, mut element: PathwayElement) -> Result<GraphId, ModelError> {
        let object_type = element.object_type;
        if matches!(object_type, ObjectType::Info | ObjectType::Biopax) && self.first_of(object_type).is_some() {
            return Err(ModelError::Singleton(object_type));
        }
        if object_type == ObjectType::State {
            let has_parent = element.parent_ref.as_deref().is_some_and(|p| self.contains(p));
            if !has_parent {
                return Err(ModelError::MissingParent(element.graph_id.clone()));
            }
        }

        let mut reserved: HashSet<GraphId> = HashSet::new();
        for id in element.owned_ids() {
            if self.ids.contains(id) || !reserved.insert(id.to_string()) {
                return Err(ModelError::DuplicateId(id.to_string()));
            }
        }
        if element.graph_id.is_empty() {
            element.graph_id = self.unique_id_excluding(&reserved);
            reserved.insert(element.graph_id.clone());
        }
        if object_type == ObjectType::Group && element.group_id.is_none() {
            let gid = self.unique_id_excluding(&reserved);
            reserved.insert(gid.clone());
            element.group_id = Some(gid);
        }
        for point in &mut element.points {
            if point.id.is_empty() {
                point.id = self.unique_id_excluding(&reserved);
                reserved.insert(point.id.clone());
            }
        }
        for anchor in &mut element.anchors {
            if anchor.id.is_empty() {
                anchor.id = self.unique_id_excluding(&reserved);
                reserved.insert(anchor.id.clone());
            }
        }

        let id = element.graph_id.clone();
        self.index(&element);
        self.order.push(id.clone());
        self.elements.insert(id.clone(), element);
        self.changed = true;
        self.emit(PathwayEvent::Added(id.clone()));
        self.grow_extent(&id);
        Ok(id)
    }

    /// Remove an element without leaving dangling references.
    ///
    /// States of a removed data node are removed too; endpoints attached to
    /// the element or to one of its anchors become free at their resolved
    /// position; members of a removed group move up to the group's parent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this graph id.
    pub fn remove(&mut self, id: &str) -> Result<PathwayElement, ModelError> {
        let element = self.require(id)?.clone();

        for state in self.states_of(id) {
            self.remove(&state)?;
        }

        let mut targets = vec![element.graph_id.clone()];
        targets.extend(element.anchors.iter().map(|a| a.id.clone()));
        for target in &targets {
            for r in self.referrers(target) {
                if r.line != element.graph_id {
                    self.unlink_point(&r.line, r.end)?;
                }
            }
        }

        if let Some(gid) = &element.group_id {
            for member in self.group_members(gid) {
                self.update(&member, |m| m.group_ref.clone_from(&element.group_ref))?;
            }
            for alias in self.aliases_of(gid) {
                self.update(&alias, |a| a.alias_ref = None)?;
            }
        }

        self.unindex(&element);
        self.elements.remove(id);
        self.order.retain(|o| o != id);
        self.changed = true;
        self.emit(PathwayEvent::Deleted(id.to_string()));
        Ok(element)
    }

    /// Mutate an element in place. The graph id cannot change; indexes are
    /// rebuilt for the element afterwards and a `Modified` event is raised.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has this graph id.
    pub fn update<R>(&mut self, id: &str, f: impl FnOnce(&mut PathwayElement) -> R) -> Result<R, ModelError> {
        let old = self.require(id)?.clone();
        let Some(element) = self.elements.get_mut(id) else {
            return Err(ModelError::NotFound(id.to_string()));
        };
        let result = f(element);
        element.graph_id.clone_from(&old.graph_id);
        let new = element.clone();
        self.unindex(&old);
        self.index(&new);
        self.changed = true;
        self.emit(PathwayEvent::Modified(id.to_string()));
        self.grow_extent(id);
        Ok(result)
    }

    /// Attach a line endpoint to `target` at a relative position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line, the endpoint or the target is missing.
    pub fn link_point(
        &mut self,
        line: &str,
        end: LineEnd,
        target: &str,
        rel_x: f64,
        rel_y: f64,
    ) -> Result<(), ModelError> {
        if self.link_target(target).is_none() {
            return Err(ModelError::NotFound(target.to_string()));
        }
        let found = self.update(line, |l| match l.point_mut(end) {
            Some(p) => {
                p.graph_ref = Some(target.to_string());
                p.rel_x = rel_x.clamp(-1.0, 1.0);
                p.rel_y = rel_y.clamp(-1.0, 1.0);
                true
            }
            None => false,
        })?;
        if found { Ok(()) } else { Err(ModelError::NotFound(line.to_string())) }
    }

    /// Detach a line endpoint, leaving it free at its current resolved position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line or the endpoint is missing.
    pub fn unlink_point(&mut self, line: &str, end: LineEnd) -> Result<(), ModelError> {
        let point = self
            .require(line)?
            .point(end)
            .cloned()
            .ok_or_else(|| ModelError::NotFound(line.to_string()))?;
        if !point.is_attached() {
            return Ok(());
        }
        let at = connector::resolve_point(self, &point);
        self.update(line, |l| {
            if let Some(p) = l.point_mut(end) {
                p.graph_ref = None;
                p.rel_x = 0.0;
                p.rel_y = 0.0;
                p.x = at.x;
                p.y = at.y;
            }
        })
    }

    // --- Snapshots ---

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { elements: self.elements().cloned().collect() }
    }

    /// Replace the whole content with `snapshot`, raising `Deleted` then `Added` events.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while re-adding the snapshot's elements.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<(), ModelError> {
        let old: Vec<GraphId> = std::mem::take(&mut self.order);
        self.elements.clear();
        self.ids.clear();
        self.referrers.clear();
        self.anchor_owner.clear();
        for id in old {
            self.emit(PathwayEvent::Deleted(id));
        }
        // parents first so states find them
        let (states, others): (Vec<_>, Vec<_>) =
            snapshot.elements.into_iter().partition(|e| e.object_type == ObjectType::State);
        for element in others.into_iter().chain(states) {
            self.add(element)?;
        }
        self.changed = true;
        Ok(())
    }

    // --- Indexes ---

    fn index(&mut self, element: &PathwayElement) {
        for id in element.owned_ids() {
            self.ids.insert(id.to_string());
        }
        for anchor in &element.anchors {
            self.anchor_owner.insert(anchor.id.clone(), element.graph_id.clone());
        }
        for end in [LineEnd::Start, LineEnd::End] {
            if let Some(target) = element.point(end).and_then(|p| p.graph_ref.clone()) {
                self.referrers
                    .entry(target)
                    .or_default()
                    .insert(PointRef { line: element.graph_id.clone(), end });
            }
        }
    }

    fn unindex(&mut self, element: &PathwayElement) {
        for id in element.owned_ids() {
            self.ids.remove(id);
        }
        for anchor in &element.anchors {
            self.anchor_owner.remove(&anchor.id);
        }
        for end in [LineEnd::Start, LineEnd::End] {
            if let Some(target) = element.point(end).and_then(|p| p.graph_ref.as_ref()) {
                if let Some(set) = self.referrers.get_mut(target) {
                    set.remove(&PointRef { line: element.graph_id.clone(), end });
                    if set.is_empty() {
                        self.referrers.remove(target);
                    }
                }
            }
        }
    }

    fn grow_extent(&mut self, id: &str) {
        let Some(bounds) = self.elements.get(id).and_then(|e| frame::element_bounds(self, e)) else {
            return;
        };
        let (w, h) = self.extent;
        if bounds.right() > w || bounds.bottom() > h {
            self.extent = (w.max(bounds.right()), h.max(bounds.bottom()));
            self.emit(PathwayEvent::Resized);
        }
    }
}
