use fauxcv::{ConnectQueue, CvError, PopError, PortId, PushError};

#[test]
fn fifo_order_at_capacity() {
    let (mut tx, mut rx) = ConnectQueue::with_capacity(64).unwrap();
    for n in 0..64u32 {
        tx.push(PortId(1000 + n)).unwrap();
    }
    for n in 0..64u32 {
        assert_eq!(rx.pop(), Ok(PortId(1000 + n)));
    }
    assert_eq!(rx.pop(), Err(PopError::Empty));
}

#[test]
/// Fill capacity 4, fail the 5th push, free one slot, retry, drain in order.
fn overflow_rejected_contents_intact() {
    let (mut tx, mut rx) = ConnectQueue::with_capacity(4).unwrap();
    for id in 1..=4 {
        tx.push(PortId(id)).unwrap();
    }
    assert_eq!(tx.push(PortId(5)), Err(PushError::Full(PortId(5))));
    assert_eq!(tx.slots(), 0);

    assert_eq!(rx.pop(), Ok(PortId(1)));
    tx.push(PortId(5)).unwrap();
    for id in 2..=5 {
        assert_eq!(rx.pop(), Ok(PortId(id)));
    }
    assert_eq!(rx.pop(), Err(PopError::Empty));
}

#[test]
fn empty_pop_yields_none_never_stale() {
    let (mut tx, mut rx) = ConnectQueue::with_capacity(8).unwrap();
    assert!(rx.is_empty());
    assert_eq!(rx.pop(), Err(PopError::Empty));

    tx.push(PortId(7)).unwrap();
    assert_eq!(rx.pop(), Ok(PortId(7)));
    assert_eq!(rx.pop(), Err(PopError::Empty));
}

#[test]
/// A one-byte copy on either side would mangle anything above 255.
fn ids_survive_at_full_width() {
    let ids = [PortId(0xDEAD_BEEF), PortId(0x0100), PortId(u32::MAX), PortId(256)];
    let (mut tx, mut rx) = ConnectQueue::with_capacity(4).unwrap();
    for id in ids {
        tx.push(id).unwrap();
    }
    for id in ids {
        assert_eq!(rx.pop(), Ok(id));
    }
}

#[test]
fn wraps_around_many_times() {
    let (mut tx, mut rx) = ConnectQueue::with_capacity(3).unwrap();
    for n in 0..1000u32 {
        tx.push(PortId(n)).unwrap();
        assert_eq!(rx.pop(), Ok(PortId(n)));
    }
}

#[test]
fn zero_capacity_rejected() {
    assert!(matches!(
        ConnectQueue::with_capacity(0),
        Err(CvError::InvalidConfiguration(_))
    ));
}

#[test]
fn abandoned_consumer_reported() {
    let (mut tx, rx) = ConnectQueue::with_capacity(4).unwrap();
    tx.push(PortId(1)).unwrap();
    assert!(!tx.is_abandoned());

    drop(rx);
    assert!(tx.is_abandoned());
    assert_eq!(tx.push(PortId(2)), Err(PushError::Abandoned(PortId(2))));
}

#[test]
/// One producer thread, one consumer thread, ids arrive in push order with
/// nothing lost or duplicated.
fn orders_across_threads() {
    let (mut tx, mut rx) = ConnectQueue::with_capacity(16).unwrap();
    let count = 50_000u32;

    let producer = std::thread::spawn(move || {
        for n in 0..count {
            loop {
                match tx.push(PortId(n)) {
                    Ok(()) => break,
                    Err(PushError::Full(_)) => std::thread::yield_now(),
                    Err(err) => panic!("unexpected push failure: {err}"),
                }
            }
        }
    });

    let mut next = 0u32;
    while next < count {
        match rx.pop() {
            Ok(id) => {
                assert_eq!(id, PortId(next));
                next += 1;
            }
            Err(PopError::Empty) => std::thread::yield_now(),
        }
    }
    producer.join().unwrap();
}
