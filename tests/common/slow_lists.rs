use std::fmt::Debug;

use dynamic_connectivity::{lists::*, Violation};

/// Dummy implementation, most of the operations take linear time.
#[derive(Clone)]
pub struct SlowLists<Ag: AggregatedData = ()> {
    lists: Vec<Vec<Entry<Ag>>>,
    u_to_list: Vec<usize>,
    freed: Vec<Idx>,
}

impl<Ag: AggregatedData> Debug for SlowLists<Ag> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SlowLists:")?;
        for l in &self.lists {
            if l.len() > 1 {
                write!(f, " [")?;
                for e in l {
                    write!(f, "{}({:?}) ", e.idx, e.data)?;
                }
                writeln!(f, "]")?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct Entry<Ag: AggregatedData> {
    idx: Idx,
    data: Ag::Data,
}

impl<Ag: AggregatedData> SlowLists<Ag> {
    fn list(&self, u: Idx) -> &Vec<Entry<Ag>> {
        if u == Self::EMPTY {
            &self.lists[0]
        } else {
            &self.lists[self.u_to_list[u]]
        }
    }
    fn entry(&self, u: Idx) -> &Entry<Ag> {
        self.list(u).iter().find(|e| e.idx == u).unwrap()
    }
    fn fold(entries: &[Entry<Ag>]) -> Ag {
        entries
            .iter()
            .fold(Ag::default(), |agg, e| agg.merge(Ag::from_data(&e.data)))
    }
    fn first_of(&self, li: usize) -> Idx {
        self.lists[li].first().map_or(Self::EMPTY, |e| e.idx)
    }
    /// Moves the entries into a new list. Returns its first node.
    fn push_list(&mut self, entries: Vec<Entry<Ag>>) -> Idx {
        let li = self.lists.len();
        for e in &entries {
            self.u_to_list[e.idx] = li;
        }
        self.lists.push(entries);
        self.first_of(li)
    }
    fn append(&mut self, u: Idx, v: Idx) -> Idx {
        if v == Self::EMPTY || self.on_same_list(u, v) {
            return self.root(u);
        } else if u == Self::EMPTY {
            return self.root(v);
        }
        let lu = self.u_to_list[u];
        let lv = self.u_to_list[v];
        let mut nv = std::mem::take(&mut self.lists[lv]);
        for w in &nv {
            self.u_to_list[w.idx] = lu;
        }
        self.lists[lu].append(&mut nv);
        self.root(u)
    }
    /// Non-empty lists, as node indices.
    pub fn lists(&self) -> Vec<Vec<Idx>> {
        self.lists
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| v.iter().map(|e| e.idx).collect())
            .collect()
    }
}

impl<Ag: AggregatedData> Lists<Ag> for SlowLists<Ag> {
    const EMPTY: Idx = usize::MAX;

    fn new(capacity: usize) -> Self {
        let mut lists = Vec::with_capacity(capacity + 1);
        // SENTINEL for EMPTY
        lists.push(vec![]);
        Self {
            lists,
            u_to_list: Vec::with_capacity(capacity),
            freed: vec![],
        }
    }

    fn create(&mut self, data: Ag::Data) -> Idx {
        let idx = self.freed.pop().unwrap_or_else(|| {
            self.u_to_list.push(0);
            self.u_to_list.len() - 1
        });
        self.push_list(vec![Entry { idx, data }]);
        idx
    }

    fn free(&mut self, u: Idx) {
        let li = self.u_to_list[u];
        assert!(li != 0, "node {u} was already freed");
        assert_eq!(self.lists[li].len(), 1, "only single nodes can be freed");
        self.lists[li].clear();
        self.u_to_list[u] = 0;
        self.freed.push(u);
    }

    fn total_size(&self) -> usize {
        self.u_to_list.len() - self.freed.len()
    }

    fn root(&self, u: Idx) -> Idx {
        if u == Self::EMPTY {
            return Self::EMPTY;
        }
        self.list(u)[0].idx
    }

    fn data(&self, u: Idx) -> &Ag::Data {
        &self.entry(u).data
    }

    fn mutate_data(&mut self, u: Idx, f: impl FnOnce(&mut Ag::Data)) {
        f(&mut self.lists[self.u_to_list[u]]
            .iter_mut()
            .find(|e| e.idx == u)
            .unwrap()
            .data)
    }

    fn order(&self, u: Idx) -> usize {
        if u == Self::EMPTY {
            return 0;
        }
        self.list(u).iter().position(|e| e.idx == u).unwrap()
    }

    fn find_element(
        &self,
        u: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, Ag>) -> SearchDirection,
    ) -> Idx {
        let left_agg = Ag::default();
        let list = self.list(u);
        use SearchDirection::*;
        for (i, e) in list.iter().enumerate() {
            let right_agg = Self::fold(&list[i + 1..]);
            match search_strategy(SearchData {
                current_data: &e.data,
                left_agg: &left_agg,
                right_agg: &right_agg,
            }) {
                Found => return e.idx,
                NotFound => return Self::EMPTY,
                Left => panic!("Should never go left"),
                Right => {}
            }
        }
        Self::EMPTY
    }

    fn find_kth(&self, u: Idx, k: usize) -> Idx {
        self.list(u).get(k).map_or(Self::EMPTY, |e| e.idx)
    }

    fn len(&self, u: Idx) -> usize {
        if u == Self::EMPTY {
            return 0;
        }
        self.list(u).len()
    }

    fn total_agg(&self, u: Idx) -> Ag {
        Self::fold(self.list(u))
    }

    fn merge(&mut self, left: Idx, middle: Idx, right: Idx) -> Idx {
        if middle != Self::EMPTY {
            assert_eq!(self.len(middle), 1, "middle node {middle} is not alone");
            assert!(
                left == Self::EMPTY || !self.on_same_list(left, right),
                "cannot merge a list with itself"
            );
        }
        let lm = self.append(left, middle);
        if lm == Self::EMPTY {
            return self.root(right);
        }
        self.append(lm, right)
    }

    fn split(&mut self, u: Idx) -> (Idx, Idx) {
        let li = self.u_to_list[u];
        let pos = self.order(u);
        let rest = self.lists[li].split_off(pos + 1);
        let right = self.push_list(rest);
        (self.first_of(li), right)
    }

    fn unlink(&mut self, u: Idx) -> Idx {
        let li = self.u_to_list[u];
        let pos = self.order(u);
        let e = self.lists[li].remove(pos);
        self.push_list(vec![e]);
        self.first_of(li)
    }

    fn validate(&self, u: Idx) -> Result<(), Violation> {
        match self.list(u).iter().find(|e| self.list(e.idx)[0].idx != self.root(u)) {
            Some(e) => Err(Violation::ParentLink { node: e.idx }),
            None => Ok(()),
        }
    }
}
