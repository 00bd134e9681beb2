use crate::file::Payload;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A `misc` entry is either a single payload or, for events that legitimately
/// repeat on the same entity (e.g. one envelope event per ADSR target), an
/// ordered list of payloads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MiscValue {
    One(Payload),
    Many(Vec<Payload>),
}

/// Per-entity storage for events the model does not decode further, keyed by
/// symbolic event name. Iteration order is not semantically meaningful — the
/// serializer prescribes emission order by name — but a sorted map keeps
/// `Debug` output and tests stable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Misc {
    entries: BTreeMap<String, MiscValue>,
}

impl Misc {
    pub fn insert<S: Into<String>>(&mut self, name: S, payload: Payload) {
        self.entries.insert(name.into(), MiscValue::One(payload));
    }

    /// Store in append mode: the entry becomes a list and grows on repeats.
    pub fn append<S: Into<String>>(&mut self, name: S, payload: Payload) {
        match self
            .entries
            .entry(name.into())
            .or_insert_with(|| MiscValue::Many(Vec::new()))
        {
            MiscValue::Many(payloads) => payloads.push(payload),
            // a plain entry already present under the name joins the list
            entry @ MiscValue::One(_) => {
                let previous = std::mem::replace(entry, MiscValue::Many(Vec::new()));
                if let (MiscValue::One(first), MiscValue::Many(payloads)) = (previous, entry) {
                    payloads.push(first);
                    payloads.push(payload);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&MiscValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The payloads stored under `name`, in order; empty if absent.
    pub fn payloads<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Payload> {
        let slice: &[Payload] = match self.entries.get(name) {
            Some(MiscValue::One(payload)) => std::slice::from_ref(payload),
            Some(MiscValue::Many(payloads)) => payloads.as_slice(),
            None => &[],
        };
        slice.iter()
    }

    /// The integer stored under `name`, if the entry is a single numeric
    /// payload.
    pub fn int(&self, name: &str) -> Option<u32> {
        match self.entries.get(name) {
            Some(MiscValue::One(payload)) => payload.int(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, MiscValue> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut misc = Misc::default();
        misc.insert("Tempo", Payload::Int(140_000));
        assert_eq!(Some(140_000), misc.int("Tempo"));
        assert_eq!(1, misc.payloads("Tempo").count());
        assert_eq!(0, misc.payloads("FLP_Color").count());
    }

    #[test]
    fn append_builds_a_list() {
        let mut misc = Misc::default();
        misc.append("ChannelEnvelopeParams", Payload::Bytes(vec![1]));
        misc.append("ChannelEnvelopeParams", Payload::Bytes(vec![2]));
        let payloads: Vec<_> = misc.payloads("ChannelEnvelopeParams").collect();
        assert_eq!(2, payloads.len());
        assert_eq!(None, misc.int("ChannelEnvelopeParams"));
    }

    #[test]
    fn append_after_insert_keeps_both() {
        let mut misc = Misc::default();
        misc.insert("UNKNOWN_228", Payload::Int(1));
        misc.append("UNKNOWN_228", Payload::Int(2));
        let payloads: Vec<_> = misc.payloads("UNKNOWN_228").collect();
        assert_eq!(
            vec![&Payload::Int(1), &Payload::Int(2)],
            payloads
        );
    }
}
