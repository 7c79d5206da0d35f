use crate::arena::Handle;
use crate::entry::Entry;
use std::fmt;

/// An enum representing the color of a node in a red black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A struct representing an internal node of a red black tree.
///
/// Missing children are `Handle::SENTINEL`; only the root has no parent.
pub struct Node<T, U>
where
    T: Ord,
{
    pub entry: Entry<T, U>,
    pub color: Color,
    pub parent: Option<Handle>,
    pub left: Handle,
    pub right: Handle,
}

impl<T, U> Node<T, U>
where
    T: Ord,
{
    pub fn new(key: T, value: U) -> Self {
        Node {
            entry: Entry { key, value },
            color: Color::Red,
            parent: None,
            left: Handle::SENTINEL,
            right: Handle::SENTINEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Node};
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_new_node_is_red_leaf() {
        let node = Node::new(1, ());
        assert_eq!(node.color, Color::Red);
        assert!(node.left.is_sentinel());
        assert!(node.right.is_sentinel());
        assert_eq!(node.parent, None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::Red.to_string(), "red");
        assert_eq!(Color::Black.to_string(), "black");
    }

    #[test]
    fn test_color_serde_tokens() {
        assert_tokens(
            &Color::Black,
            &[Token::UnitVariant {
                name: "Color",
                variant: "Black",
            }],
        );
    }
}
