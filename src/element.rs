//! Element descriptors - Immutable values describing one logical node.
//!
//! An [`Element`] names a type (a host tag or a [`Component`]), an optional
//! key, and its [`Props`]. Children live in `props.children` as a [`Node`]:
//! a single element or text, or an ordered list of them.
//!
//! ```ignore
//! use spark_fiber::{Component, Element, Node};
//!
//! let item = Component::new("Item", |props| {
//!     Ok(Element::host("li").child(props.get_str("label").unwrap_or("")).into())
//! });
//!
//! let list = Element::host("ul").children([
//!     Element::component(&item).key("a").prop("label", "first"),
//!     Element::component(&item).key("b").prop("label", "second"),
//! ]);
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::RenderError;
use crate::events::{EventCallback, SyntheticEvent};

/// Element key, compared by string content.
pub type Key = Rc<str>;

/// Result of rendering a function component.
pub type RenderResult = Result<Node, RenderError>;

/// Opaque element ref. Carried on the descriptor, not interpreted by the reconciler.
pub type ElementRef = Rc<dyn Any>;

// =============================================================================
// Component
// =============================================================================

/// A function component.
///
/// Identity is the identity of the wrapped closure: clones of one
/// `Component` are the same type, two `Component::new` calls are not, even
/// with the same name.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<dyn Fn(&Props) -> RenderResult>,
}

impl Component {
    /// Wrap a render function.
    pub fn new(name: &str, render: impl Fn(&Props) -> RenderResult + 'static) -> Self {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    /// Display name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn render(&self, props: &Props) -> RenderResult {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

// =============================================================================
// Element Type
// =============================================================================

/// What an element renders as.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// Platform node, e.g. `"div"`.
    Host(Rc<str>),
    /// Function component.
    Component(Component),
}

impl ElementType {
    /// Host tag, if this is a host type.
    pub fn host_tag(&self) -> Option<&str> {
        match self {
            ElementType::Host(tag) => Some(tag),
            ElementType::Component(_) => None,
        }
    }
}

// =============================================================================
// Prop Value
// =============================================================================

/// A single prop value.
#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Event callback, stored on the host instance for the event system.
    Callback(EventCallback),
}

impl PropValue {
    /// String form used when the value becomes a host attribute.
    ///
    /// `None` means the attribute is absent (null, `false`, callbacks).
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            PropValue::Null | PropValue::Bool(false) | PropValue::Callback(_) => None,
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Int(v) => Some(v.to_string()),
            PropValue::Float(v) => Some(v.to_string()),
            PropValue::Str(v) => Some(v.to_string()),
        }
    }

    /// Whether this is a callback.
    pub fn is_callback(&self) -> bool {
        matches!(self, PropValue::Callback(_))
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Callback(a), PropValue::Callback(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => write!(f, "Null"),
            PropValue::Bool(v) => write!(f, "Bool({v})"),
            PropValue::Int(v) => write!(f, "Int({v})"),
            PropValue::Float(v) => write!(f, "Float({v})"),
            PropValue::Str(v) => write!(f, "Str({v:?})"),
            PropValue::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<EventCallback> for PropValue {
    fn from(value: EventCallback) -> Self {
        PropValue::Callback(value)
    }
}

// =============================================================================
// Props
// =============================================================================

#[derive(Clone, Default)]
struct PropsInner {
    values: BTreeMap<String, PropValue>,
    children: Node,
}

/// Open key-value props plus `children`.
///
/// Cheap to clone; builder methods copy-on-write.
#[derive(Clone, Default)]
pub struct Props {
    inner: Rc<PropsInner>,
}

const TEXT_CONTENT: &str = "content";

impl Props {
    /// Empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Props of a text fiber.
    pub(crate) fn text(content: Rc<str>) -> Self {
        Self::new().with(TEXT_CONTENT, PropValue::Str(content))
    }

    /// Set a prop.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.inner)
            .values
            .insert(name.into(), value.into());
        self
    }

    /// Replace `children`.
    pub fn with_children(mut self, children: impl Into<Node>) -> Self {
        Rc::make_mut(&mut self.inner).children = children.into();
        self
    }

    fn push_child(&mut self, child: Node) {
        let inner = Rc::make_mut(&mut self.inner);
        let children = std::mem::take(&mut inner.children);
        inner.children = match children {
            Node::Empty => child,
            Node::List(mut list) => {
                list.push(child);
                Node::List(list)
            }
            single => Node::List(vec![single, child]),
        };
    }

    /// Look up a prop.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.inner.values.get(name)
    }

    /// Look up a string prop.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up an integer prop.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(PropValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Look up a callback prop.
    pub fn callback(&self, name: &str) -> Option<&EventCallback> {
        match self.get(name) {
            Some(PropValue::Callback(cb)) => Some(cb),
            _ => None,
        }
    }

    /// Nested children.
    pub fn children(&self) -> &Node {
        &self.inner.children
    }

    /// Text content of a text fiber's props.
    pub(crate) fn content(&self) -> Option<&str> {
        self.get_str(TEXT_CONTENT)
    }

    /// Iterate over all props in name order (children excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.inner.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Host attributes: every non-callback prop that renders to a value.
    pub fn attributes(&self) -> BTreeMap<String, String> {
        self.inner
            .values
            .iter()
            .filter_map(|(k, v)| v.to_attribute().map(|a| (k.clone(), a)))
            .collect()
    }

    /// Whether two prop sets produce the same host attributes.
    ///
    /// Callbacks and children are ignored: callbacks are read through the
    /// stored props, children are reconciled separately.
    pub fn attributes_eq(&self, other: &Props) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let mine = self.inner.values.iter().filter(|(_, v)| !v.is_callback());
        let theirs = other.inner.values.iter().filter(|(_, v)| !v.is_callback());
        mine.eq(theirs)
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("values", &self.inner.values)
            .field("children", &self.inner.children)
            .finish()
    }
}

// =============================================================================
// Element
// =============================================================================

/// An element descriptor.
#[derive(Clone, Debug)]
pub struct Element {
    pub(crate) element_type: ElementType,
    pub(crate) key: Option<Key>,
    pub(crate) element_ref: Option<ElementRefSlot>,
    pub(crate) props: Props,
}

/// Wrapper so `Element` can stay `Debug`.
#[derive(Clone)]
pub(crate) struct ElementRefSlot(ElementRef);

impl fmt::Debug for ElementRefSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementRef(..)")
    }
}

impl Element {
    /// Host element with the given tag.
    pub fn host(tag: &str) -> Self {
        Self::new(ElementType::Host(Rc::from(tag)))
    }

    /// Element rendering a function component.
    pub fn component(component: &Component) -> Self {
        Self::new(ElementType::Component(component.clone()))
    }

    /// Element of any type.
    pub fn new(element_type: ElementType) -> Self {
        Self {
            element_type,
            key: None,
            element_ref: None,
            props: Props::new(),
        }
    }

    /// Set the key.
    pub fn key(mut self, key: impl fmt::Display) -> Self {
        self.key = Some(Rc::from(key.to_string()));
        self
    }

    /// Attach an opaque ref.
    pub fn with_ref(mut self, element_ref: ElementRef) -> Self {
        self.element_ref = Some(ElementRefSlot(element_ref));
        self
    }

    /// Set a prop.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props = self.props.with(name, value);
        self
    }

    /// Set an event callback prop, e.g. `on("onClick", ..)`.
    pub fn on(self, name: impl Into<String>, callback: impl Fn(&SyntheticEvent) + 'static) -> Self {
        let callback: EventCallback = Rc::new(callback);
        self.prop(name, callback)
    }

    /// Append one child. A single child stays single; more become a list.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.props.push_child(child.into());
        self
    }

    /// Set children to an ordered list.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Node>,
    {
        let list = children.into_iter().map(Into::into).collect();
        self.props = self.props.with_children(Node::List(list));
        self
    }

    /// Replace all props (children included).
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    pub fn get_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn get_ref(&self) -> Option<&ElementRef> {
        self.element_ref.as_ref().map(|slot| &slot.0)
    }

    pub fn props(&self) -> &Props {
        &self.props
    }
}

// =============================================================================
// Node
// =============================================================================

/// A child value: nothing, text, an element, or an ordered list.
#[derive(Clone, Debug, Default)]
pub enum Node {
    #[default]
    Empty,
    Text(Rc<str>),
    Element(Element),
    List(Vec<Node>),
}

impl Node {
    /// Whether this is [`Node::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(Rc::from(text))
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(Rc::from(text))
    }
}

macro_rules! node_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Text(Rc::from(value.to_string()))
                }
            }
        )*
    };
}

node_from_number!(i32, i64, u32, u64, usize, f64);

impl From<Vec<Node>> for Node {
    fn from(list: Vec<Node>) -> Self {
        Node::List(list)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}

// =============================================================================
// Tests
// =============================================================================
