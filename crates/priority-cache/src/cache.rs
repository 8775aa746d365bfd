use crate::error::{CacheError, Result};
use crate::stats::{CacheStats, StatCounters};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Ranks a cached value for eviction. The entry with the smallest priority is
/// the first to go once the cache is full.
pub trait CachePriority {
    type Priority: Ord + Clone;

    fn priority(&self) -> Self::Priority;
}

macro_rules! impl_cache_priority_for_ints {
    ($($ty:ty),*) => {
        $(
            impl CachePriority for $ty {
                type Priority = $ty;

                fn priority(&self) -> $ty {
                    *self
                }
            }
        )*
    };
}

impl_cache_priority_for_ints!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<T: CachePriority + ?Sized> CachePriority for Arc<T> {
    type Priority = T::Priority;

    fn priority(&self) -> Self::Priority {
        (**self).priority()
    }
}

/// Heap entry. `seq` only breaks ties so the key itself never needs `Ord`.
struct HeapSlot<P, K> {
    priority: P,
    seq: u64,
    key: K,
}

impl<P: Ord, K> Ord for HeapSlot<P, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl<P: Ord, K> PartialOrd for HeapSlot<P, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Ord, K> PartialEq for HeapSlot<P, K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: Ord, K> Eq for HeapSlot<P, K> {}

/// Map and min-heap kept in lockstep: every key in `values` has exactly one
/// heap slot and the heap holds nothing else.
struct Slots<K, V: CachePriority> {
    values: HashMap<K, V>,
    heap: BinaryHeap<Reverse<HeapSlot<V::Priority, K>>>,
    in_flight: HashSet<K>,
    next_seq: u64,
}

impl<K: Eq + Hash + Clone, V: CachePriority> Slots<K, V> {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            heap: BinaryHeap::new(),
            in_flight: HashSet::new(),
            next_seq: 0,
        }
    }

    fn min_priority(&self) -> Option<&V::Priority> {
        self.heap.peek().map(|Reverse(slot)| &slot.priority)
    }

    fn admit(&mut self, key: K, value: V, capacity: usize, counters: &StatCounters) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        if capacity == 0 {
            counters.rejection();
            return false;
        }

        let priority = value.priority();
        if self.values.len() >= capacity {
            let Some(minimum) = self.min_priority() else {
                return false;
            };
            if priority <= *minimum {
                counters.rejection();
                return false;
            }
            if let Some(Reverse(evicted)) = self.heap.pop() {
                self.values.remove(&evicted.key);
                counters.eviction();
            }
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Reverse(HeapSlot {
            priority,
            seq,
            key: key.clone(),
        }));
        self.values.insert(key, value);
        true
    }
}

/// Bounded memoization cache with value-priority eviction.
///
/// All state sits behind one mutex. A miss claims its key before computing, so
/// concurrent callers asking for the same key wait for that result instead of
/// computing it again. The compute function runs without the lock held and may
/// itself call back into the cache for *other* keys; asking for its own key
/// from inside the computation deadlocks.
pub struct PriorityCache<K, V: CachePriority> {
    capacity: usize,
    slots: Mutex<Slots<K, V>>,
    ready: Condvar,
    counters: StatCounters,
}

impl<K, V> PriorityCache<K, V>
where
    K: Eq + Hash + Clone,
    V: CachePriority + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Mutex::new(Slots::new()),
            ready: Condvar::new(),
            counters: StatCounters::default(),
        }
    }

    /// Build from a configured size where negative values are a configuration error.
    pub fn with_signed_capacity(max_size: i64) -> Result<Self> {
        if max_size < 0 {
            return Err(CacheError::NegativeCapacity(max_size));
        }
        Ok(Self::new(usize::try_from(max_size).unwrap_or(usize::MAX)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lock().values.contains_key(key)
    }

    /// Lookup without computing. Counts as a hit when present.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.lock().values.get(key).cloned();
        if value.is_some() {
            self.counters.hit();
        }
        value
    }

    /// Smallest priority currently held, the next eviction candidate.
    pub fn min_priority(&self) -> Option<V::Priority> {
        self.lock().min_priority().cloned()
    }

    /// Offer an already computed value under the eviction policy.
    ///
    /// Returns `true` when the value was stored. An existing entry for the key is
    /// left untouched.
    pub fn offer(&self, key: K, value: V) -> bool {
        let mut slots = self.lock();
        slots.admit(key, value, self.capacity, &self.counters)
    }

    pub fn get_or_compute(&self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        match self.get_or_try_compute(key, |key| Ok::<V, Infallible>(compute(key))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible computations.
    /// Errors propagate and nothing is cached for them.
    pub fn get_or_try_compute<E>(
        &self,
        key: K,
        compute: impl FnOnce(&K) -> std::result::Result<V, E>,
    ) -> std::result::Result<V, E> {
        {
            let mut slots = self.lock();
            loop {
                if let Some(value) = slots.values.get(&key) {
                    self.counters.hit();
                    return Ok(value.clone());
                }
                if !slots.in_flight.contains(&key) {
                    break;
                }
                slots = self
                    .ready
                    .wait(slots)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            slots.in_flight.insert(key.clone());
        }
        self.counters.miss();

        let claim = Claim {
            cache: self,
            key,
            settled: false,
        };
        let value = compute(&claim.key)?;
        claim.settle(value.clone());
        Ok(value)
    }

    pub fn stats(&self) -> CacheStats {
        let len = self.len();
        self.counters.snapshot(len)
    }

    fn lock(&self) -> MutexGuard<'_, Slots<K, V>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a key as being computed. Dropping it without settling (error or
/// panic in the compute function) releases the key so waiters retry.
struct Claim<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: CachePriority + Clone,
{
    cache: &'a PriorityCache<K, V>,
    key: K,
    settled: bool,
}

impl<K, V> Claim<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: CachePriority + Clone,
{
    fn settle(mut self, value: V) {
        let cache = self.cache;
        {
            let mut slots = cache.lock();
            slots.in_flight.remove(&self.key);
            if !slots.admit(self.key.clone(), value, cache.capacity, &cache.counters) {
                log::trace!("computed value not retained (cache full of larger entries)");
            }
        }
        self.settled = true;
        cache.ready.notify_all();
    }
}

impl<K, V> Drop for Claim<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: CachePriority + Clone,
{
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.cache.lock().in_flight.remove(&self.key);
        self.cache.ready.notify_all();
    }
}
