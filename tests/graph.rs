use ghost_cleanup::{Arena, Collect, Collector, Gc, Mutation, Rootable, Weak};

#[derive(Debug, Clone)]
struct Graph<'b, T>(Vec<Gc<'b, Node<'b, T>>>);

impl<'b, T> Graph<'b, T> {
    fn add_node(&mut self, value: T, parent_idx: Option<usize>, mt: &Mutation<'b>) -> usize
    where
        T: Collect,
    {
        let node = Gc::new(
            Node {
                value,
                parent: parent_idx.map(|idx| self.0[idx]),
            },
            mt,
        );

        self.0.push(node);

        self.0.len() - 1
    }
}

unsafe impl<T: Collect> Collect for Graph<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        self.0.trace(c);
    }
}

impl<T: Collect + 'static> Rootable for Graph<'static, T> {
    type Root<'l> = Graph<'l, T>;
}

#[derive(Debug)]
struct Node<'b, T> {
    value: T,
    parent: Option<Gc<'b, Self>>,
}

unsafe impl<T: Collect> Collect for Node<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        self.value.trace(c);
        self.parent.trace(c);
    }
}

#[test]
fn unreachable_objects_are_freed() {
    let mut a = Arena::<Graph<'static, i32>>::new(|_| Graph(vec![]));

    a.view_mut(|graph, mt| {
        graph.add_node(0, None, mt);
        graph.add_node(1, Some(0), mt);
        graph.add_node(2, Some(0), mt);
    });

    assert_eq!(a.allocations(), 3);
    a.complete_collection();
    assert_eq!(a.allocations(), 3);

    a.view(|_, mt| {
        let _ = Gc::new(100, mt);
    });

    assert_eq!(a.allocations(), 4);
    a.complete_collection();
    assert_eq!(a.allocations(), 3);
}

#[test]
fn parents_are_kept_alive_by_children() {
    let mut a = Arena::<Graph<'static, i32>>::new(|_| Graph(vec![]));

    a.view_mut(|graph, mt| {
        graph.add_node(0, None, mt);
        graph.add_node(1, Some(0), mt);
        graph.add_node(2, Some(1), mt);

        // Only the leaf stays in the root.
        let leaf = graph.0[2];
        graph.0 = vec![leaf];
    });

    a.complete_collection();
    assert_eq!(a.allocations(), 3);

    a.view(|graph, _| {
        let mut depth = 0;
        let mut node = graph.0[0];
        while let Some(parent) = node.parent {
            node = parent;
            depth += 1;
        }

        assert_eq!(depth, 2);
        assert_eq!(node.value, 0);
    });
}

#[test]
fn strings_survive_collection() {
    let mut a = Arena::<Graph<'static, String>>::new(|_| Graph(vec![]));

    a.view_mut(|graph, mt| {
        graph.add_node(String::from("root"), None, mt);
        graph.add_node(String::from("leaf"), Some(0), mt);
    });

    a.complete_collection();

    a.view(|graph, _| {
        assert_eq!(graph.0[1].value, "leaf");
        assert_eq!(
            graph.0[1].parent.map(|p| p.value.clone()),
            Some(String::from("root"))
        );
    });
}

struct Weakly<'b>(Vec<Weak<'b, u64>>, Vec<Gc<'b, u64>>);

unsafe impl Collect for Weakly<'_> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        self.0.trace(c);
        self.1.trace(c);
    }
}

impl Rootable for Weakly<'static> {
    type Root<'l> = Weakly<'l>;
}

#[test]
fn weak_pointers_observe_reclamation() {
    let mut a = Arena::<Weakly<'static>>::new(|_| Weakly(vec![], vec![]));

    a.view_mut(|root, mt| {
        let kept = Gc::new(1, mt);
        let lost = Gc::new(2, mt);

        root.0.push(Gc::downgrade(kept));
        root.0.push(Gc::downgrade(lost));
        root.1.push(kept);
    });

    a.complete_collection();

    a.view(|root, _| {
        assert_eq!(root.0[0].upgrade().map(|gc| *gc), Some(1));
        assert!(root.0[1].upgrade().is_none());
        assert!(root.0[1].is_dead());
    });

    // The dead allocation stays around while the weak pointer is reachable.
    assert_eq!(a.allocations(), 2);

    a.view_mut(|root, _| root.0.clear());
    a.complete_collection();
    assert_eq!(a.allocations(), 1);
}

#[test]
fn empty_weak_is_dead() {
    let weak = Weak::<u64>::new();

    assert!(weak.is_dead());
    assert!(weak.upgrade().is_none());
}
