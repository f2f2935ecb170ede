use cordyceps_avl::AvlSet;
use tracing_subscriber::EnvFilter;

fn print_in_order(set: &AvlSet<u32>) {
    for (key, factor) in set.in_order() {
        println!("{key} {factor}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut set = AvlSet::new();

    for key in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
        set.insert(key);
        set.assert_invariants();
    }

    println!("in-order (key factor):");
    print_in_order(&set);
    println!("pre-order: {:?}", set.pre_order().collect::<Vec<_>>());

    for key in [3, 8, 10] {
        match set.delete(&key) {
            Ok(key) => tracing::info!(key, height = set.height(), "deleted"),
            Err(error) => tracing::warn!(key, %error, "delete failed"),
        }
        set.assert_invariants();
    }

    println!("in-order (key factor):");
    print_in_order(&set);
    println!("pre-order: {:?}", set.pre_order().collect::<Vec<_>>());

    let first = set.pop_first();
    assert_eq!(first, Some(1));
    set.assert_invariants();

    drop(set);
}
