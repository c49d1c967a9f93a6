use dynamic_connectivity::{DynamicConnectivity, FastConnectivity};

fn insert(t: &mut FastConnectivity, a: usize, b: usize) {
    println!("Adding edge between {} and {}", a, b);
    t.insert(a, b);
}

fn remove(t: &mut FastConnectivity, a: usize, b: usize) {
    println!("Removing edge between {} and {}", a, b);
    t.remove(a, b);
}

fn connected(t: &FastConnectivity, a: usize, b: usize) {
    println!(
        "Are {} and {} connected? {} ({} components)",
        a,
        b,
        if t.connected(a, b) { "Yes" } else { "No" },
        t.component_count()
    );
}

fn main() {
    let mut t = FastConnectivity::new(10);
    for u in 0..9 {
        t.insert(u, u + 1);
    }
    println!("Created a path of length 10 (vertices 0 to 9)");
    connected(&t, 0, 9);
    remove(&mut t, 4, 5);
    connected(&t, 0, 9);
    insert(&mut t, 0, 9);
    connected(&t, 4, 5);
    remove(&mut t, 2, 3);
    connected(&t, 2, 3);
    connected(&t, 3, 4);
    remove(&mut t, 0, 9);
    connected(&t, 0, 9);
}
