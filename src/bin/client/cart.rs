use std::fmt;
use std::mem;
use crate::api::OrderItem;

/// Main-course menus, each holds at most one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Course {
    Breakfast,
    Lunch,
    Dinner,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Breakfast, Course::Lunch, Course::Dinner];

    /// catalog `type` of the meals listed under this course
    pub fn menu(&self) -> &'static str {
        match self {
            Course::Breakfast => "breakfast",
            Course::Lunch => "lunch",
            Course::Dinner => "dinner",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Course::Breakfast => write!(f, "Breakfast"),
            Course::Lunch => write!(f, "Lunch"),
            Course::Dinner => write!(f, "Dinner"),
        }
    }
}

pub(crate) const ADDITIONAL: &str = "Additional";

type Observer = Box<dyn FnMut(&Cart)>;

/// The order being built: one optional meal per course plus any number of
/// additional meals. Observers are called after every change.
#[derive(Default)]
pub(crate) struct Cart {
    mains: [Option<OrderItem>; 3],
    additional: Vec<OrderItem>,
    observers: Vec<Observer>,
}

impl Cart {
    pub fn on_change(&mut self, observer: impl FnMut(&Cart) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// put `name` on the course's menu, replacing an earlier choice
    pub fn select(&mut self, course: Course, name: &str, price: f64) {
        self.mains[course.slot()] = Some(OrderItem {
            name: name.to_string(),
            category: course.to_string(),
            price,
        });
        self.notify();
    }

    pub fn clear(&mut self, course: Course) {
        if self.mains[course.slot()].take().is_some() {
            self.notify();
        }
    }

    pub fn add_additional(&mut self, name: &str, price: f64) {
        self.additional.push(OrderItem {
            name: name.to_string(),
            category: ADDITIONAL.to_string(),
            price,
        });
        self.notify();
    }

    pub fn remove_additional(&mut self, index: usize) -> Option<OrderItem> {
        if index >= self.additional.len() {
            return None;
        }
        let removed = self.additional.remove(index);
        self.notify();
        Some(removed)
    }

    /// main courses in menu order, then additional meals in the order they were added
    pub fn line_items(&self) -> Vec<OrderItem> {
        self.mains
            .iter()
            .flatten()
            .chain(self.additional.iter())
            .cloned()
            .collect()
    }

    /// sum of all selections, rounded to cents
    pub fn total(&self) -> f64 {
        let sum: f64 = self
            .mains
            .iter()
            .flatten()
            .chain(self.additional.iter())
            .map(|item| item.price)
            .sum();
        (sum * 100.0).round() / 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.mains.iter().all(Option::is_none) && self.additional.is_empty()
    }

    fn notify(&mut self) {
        let mut observers = mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer(&*self);
        }
        // observers registered during notification are kept too
        observers.append(&mut self.observers);
        self.observers = observers;
    }
}
