use super::domain::{ApartmentId, Reservation};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

type SlotKey = (ApartmentId, NaiveDate);

#[derive(Debug)]
struct Slot {
    chosen: usize,
    contenders: Vec<usize>,
}

/// Date-keyed lookup over one snapshot of active reservations.
///
/// Only `active` reservations are kept. When two reservations claim the same
/// apartment and day the one created first wins (undated records lose to
/// dated ones, then reservation id decides); the losers stay reachable
/// through the `*_conflicts` accessors.
///
/// A same-day stay is indexed as a checkout only, so it never becomes the
/// arrival that bounds its own cleaning window.
#[derive(Debug, Default)]
pub struct ReservationIndex {
    reservations: Vec<Reservation>,
    checkouts: HashMap<SlotKey, Slot>,
    checkins: HashMap<SlotKey, Slot>,
}

impl ReservationIndex {
    pub fn new<I>(reservations: I) -> Self
    where
        I: IntoIterator<Item = Reservation>,
    {
        let reservations: Vec<Reservation> = reservations
            .into_iter()
            .filter(Reservation::is_active)
            .collect();

        let mut checkouts = HashMap::with_capacity(reservations.len());
        let mut checkins = HashMap::with_capacity(reservations.len());

        for (position, reservation) in reservations.iter().enumerate() {
            let apartment = reservation.apartment_id.clone();
            place(
                &mut checkouts,
                &reservations,
                (apartment.clone(), reservation.check_out_date),
                position,
            );
            if reservation.check_in_date == reservation.check_out_date {
                continue;
            }
            place(
                &mut checkins,
                &reservations,
                (apartment, reservation.check_in_date),
                position,
            );
        }

        Self {
            reservations,
            checkouts,
            checkins,
        }
    }

    pub fn find_checkout(&self, apartment_id: &ApartmentId, date: NaiveDate) -> Option<&Reservation> {
        self.lookup(&self.checkouts, apartment_id, date)
    }

    pub fn find_checkin(&self, apartment_id: &ApartmentId, date: NaiveDate) -> Option<&Reservation> {
        self.lookup(&self.checkins, apartment_id, date)
    }

    /// Reservations that lost the checkout tie-break, in precedence order.
    pub fn checkout_conflicts(&self, apartment_id: &ApartmentId, date: NaiveDate) -> Vec<&Reservation> {
        self.conflicts(&self.checkouts, apartment_id, date)
    }

    pub fn checkin_conflicts(&self, apartment_id: &ApartmentId, date: NaiveDate) -> Vec<&Reservation> {
        self.conflicts(&self.checkins, apartment_id, date)
    }

    /// Every indexed reservation that starts or ends on `date`.
    pub fn reservations_on(&self, date: NaiveDate) -> impl Iterator<Item = &Reservation> + '_ {
        self.reservations
            .iter()
            .filter(move |reservation| {
                reservation.check_in_date == date || reservation.check_out_date == date
            })
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    fn lookup(
        &self,
        slots: &HashMap<SlotKey, Slot>,
        apartment_id: &ApartmentId,
        date: NaiveDate,
    ) -> Option<&Reservation> {
        slots
            .get(&(apartment_id.clone(), date))
            .map(|slot| &self.reservations[slot.chosen])
    }

    fn conflicts(
        &self,
        slots: &HashMap<SlotKey, Slot>,
        apartment_id: &ApartmentId,
        date: NaiveDate,
    ) -> Vec<&Reservation> {
        let mut losers: Vec<&Reservation> = slots
            .get(&(apartment_id.clone(), date))
            .map(|slot| {
                slot.contenders
                    .iter()
                    .map(|&position| &self.reservations[position])
                    .collect()
            })
            .unwrap_or_default();
        losers.sort_by(|a, b| precedence(a, b));
        losers
    }
}

fn place(
    slots: &mut HashMap<SlotKey, Slot>,
    reservations: &[Reservation],
    key: SlotKey,
    position: usize,
) {
    match slots.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(Slot {
                chosen: position,
                contenders: Vec::new(),
            });
        }
        Entry::Occupied(mut entry) => {
            let slot = entry.get_mut();
            if precedence(&reservations[position], &reservations[slot.chosen]) == Ordering::Less {
                let displaced = std::mem::replace(&mut slot.chosen, position);
                slot.contenders.push(displaced);
            } else {
                slot.contenders.push(position);
            }
        }
    }
}

fn precedence(a: &Reservation, b: &Reservation) -> Ordering {
    let by_creation = match (a.created_at, b.created_at) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_creation.then_with(|| a.id.cmp(&b.id))
}
