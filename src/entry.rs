use std::cmp::Ordering;

/// A key bound to its payload. Entries are ordered and compared by key only.
#[derive(Serialize, Deserialize, Debug)]
pub struct Entry<T, U>
where
    T: Ord,
{
    pub key: T,
    pub value: U,
}

impl<T, U> Ord for Entry<T, U>
where
    T: Ord,
{
    fn cmp(&self, other: &Entry<T, U>) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<T, U> PartialOrd for Entry<T, U>
where
    T: Ord,
{
    fn partial_cmp(&self, other: &Entry<T, U>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, U> PartialEq for Entry<T, U>
where
    T: Ord,
{
    fn eq(&self, other: &Entry<T, U>) -> bool {
        self.key == other.key
    }
}

impl<T, U> Eq for Entry<T, U> where T: Ord {}

#[cfg(test)]
mod tests {
    use super::Entry;
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_ordering_ignores_value() {
        let a = Entry { key: 1, value: "b" };
        let b = Entry { key: 1, value: "a" };
        let c = Entry { key: 2, value: "a" };
        assert_eq!(a, b);
        assert!(a < c);
        assert!(!(a < b));
    }

    #[test]
    fn test_serde_tokens() {
        let entry = Entry {
            key: 20u32,
            value: String::from("Value 20"),
        };
        assert_tokens(
            &entry,
            &[
                Token::Struct {
                    name: "Entry",
                    len: 2,
                },
                Token::Str("key"),
                Token::U32(20),
                Token::Str("value"),
                Token::Str("Value 20"),
                Token::StructEnd,
            ],
        );
    }
}
