use std::net::IpAddr;
use anyhow::Result;
use super::{BoundedSet, Capped};

fn ips(addrs: &[&str]) -> Result<Vec<IpAddr>> {
    Ok(addrs.iter().map(|s| s.parse::<IpAddr>()).collect::<Result<Vec<_>, _>>()?)
}

#[test]
fn counts_past_capacity() -> Result<()> {
    let mut set = BoundedSet::new(2);
    for ip in ips(&["1.0.0.1", "1.0.0.2", "1.0.0.3", "1.0.0.2"])? {
        set.add(ip);
    }

    assert_eq!(2, set.len());
    assert_eq!(3, set.total_count());
    assert_eq!(ips(&["1.0.0.1", "1.0.0.2"])?, set.to_ip_vec());

    Ok(())
}

#[test]
fn combine_sums_totals() -> Result<()> {
    let mut a = BoundedSet::from_slice_with_total(3, &ips(&["1.0.0.1", "1.0.0.2"])?, 4);
    let b     = BoundedSet::from_slice_with_total(3, &ips(&["1.0.0.3", "1.0.0.4"])?, 2);

    a.combine(&b);

    assert_eq!(3, a.len());
    assert_eq!(6, a.total_count());
    assert!(!a.contains(&"1.0.0.4".parse()?));

    a.reset();
    assert!(a.is_empty());
    assert_eq!(0, a.total_count());

    Ok(())
}

#[test]
fn seeded_total_covers_elements() -> Result<()> {
    let set = BoundedSet::from_slice_with_total(5, &ips(&["1.0.0.1", "1.0.0.2"])?, 0);
    assert_eq!(2, set.total_count());
    Ok(())
}

#[test]
fn capped_stops_when_full() {
    let mut domains = Capped::new(2);
    assert!(domains.add("a.com".to_string()));
    assert!(!domains.add("a.com".to_string()));
    assert!(domains.add("b.com".to_string()));
    assert!(!domains.add("c.com".to_string()));

    assert!(domains.is_full());
    assert_eq!(vec!["a.com", "b.com"], domains.to_vec());

    domains.clear();
    domains.extend(&["x.com".to_string(), "y.com".to_string(), "z.com".to_string()]);
    assert_eq!(vec!["x.com", "y.com"], domains.to_vec());
}

#[test]
fn capped_keeps_first_seen_order() {
    let mut args = Capped::unbounded();
    for n in (0..1_000).rev() {
        assert!(args.add(format!("--worker={}", n)));
    }
    for n in 0..1_000 {
        assert!(!args.add(format!("--worker={}", n)));
    }

    assert_eq!(1_000, args.len());
    assert!(args.contains(&"--worker=500".to_string()));
    assert_eq!(Some(&"--worker=999".to_string()), args.iter().next());
    assert_eq!(Some(&"--worker=0".to_string()),   args.iter().rev().next());

    args.clear();
    assert!(!args.contains(&"--worker=500".to_string()));
    assert!(args.add("--worker=500".to_string()));
}
