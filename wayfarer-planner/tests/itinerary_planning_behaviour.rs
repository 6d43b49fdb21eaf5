//! Behavioural tests for clustering and scheduling a trip.

use std::cell::RefCell;
use std::collections::BTreeSet;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::{DayPlan, MealType, PointOfInterest, TimeSlot, TimeWindow};
use wayfarer_planner::ItineraryPlanner;

const UNLOCATED_ID: u64 = 99;

#[derive(Debug, Default)]
struct PlanningWorld {
    pois: RefCell<Vec<PointOfInterest>>,
    days: RefCell<Vec<DayPlan>>,
}

#[fixture]
fn world() -> PlanningWorld {
    PlanningWorld::default()
}

fn slot(value: &str) -> TimeSlot {
    value.parse().expect("valid time")
}

#[given("four points of interest in Cebu City")]
fn given_four_points(world: &PlanningWorld) {
    world.pois.replace(vec![
        PointOfInterest::new(1, "Fort San Pedro", Coord { x: 123.9054, y: 10.2925 }),
        PointOfInterest::new(2, "Magellan's Cross", Coord { x: 123.9019, y: 10.2934 }),
        PointOfInterest::new(3, "Taoist Temple", Coord { x: 123.8865, y: 10.3398 }),
        PointOfInterest::new(4, "Temple of Leah", Coord { x: 123.8708, y: 10.3644 }),
    ]);
}

#[given("a point of interest without coordinates")]
fn given_unlocated(world: &PlanningWorld) {
    world
        .pois
        .borrow_mut()
        .push(PointOfInterest::unlocated(UNLOCATED_ID, "Secret Beach"));
}

#[when("I plan {days:usize} days from {start} to {end}")]
fn when_plan(world: &PlanningWorld, days: usize, start: String, end: String) {
    let window = TimeWindow::new(slot(&start), slot(&end)).expect("valid window");
    let plan = ItineraryPlanner::new().plan(&world.pois.borrow(), days, window);
    world.days.replace(plan);
}

#[then("every day has {count:usize} stops")]
fn then_stop_count(world: &PlanningWorld, count: usize) {
    let days = world.days.borrow();
    assert!(!days.is_empty());
    assert!(days.iter().all(|day| day.stops.len() == count));
}

#[then("every day starts at {first} with the second stop at {second}")]
fn then_slots(world: &PlanningWorld, first: String, second: String) {
    for day in world.days.borrow().iter() {
        assert_eq!(day.stops[0].time_slot, Some(slot(&first)));
        assert_eq!(day.stops[1].time_slot, Some(slot(&second)));
    }
}

#[then("every point of interest appears exactly once")]
fn then_permutation(world: &PlanningWorld) {
    let planned: Vec<u64> = world
        .days
        .borrow()
        .iter()
        .flat_map(|day| day.stops.iter().map(|stop| stop.poi.id))
        .collect();
    let unique: BTreeSet<u64> = planned.iter().copied().collect();
    let expected: BTreeSet<u64> = world.pois.borrow().iter().map(|poi| poi.id).collect();
    assert_eq!(planned.len(), unique.len(), "no duplicates");
    assert_eq!(unique, expected);
}

#[then("the first stop is tagged lunch")]
fn then_lunch(world: &PlanningWorld) {
    let days = world.days.borrow();
    assert_eq!(days[0].stops[0].meal_type, MealType::Lunch);
}

#[then("the last stop is the point without coordinates")]
fn then_unlocated_last(world: &PlanningWorld) {
    let days = world.days.borrow();
    let last = days[0].stops.last().expect("day has stops");
    assert_eq!(last.poi.id, UNLOCATED_ID);
}

#[then("no days are produced")]
fn then_no_days(world: &PlanningWorld) {
    assert!(world.days.borrow().is_empty());
}

#[scenario(path = "tests/features/itinerary_planning.feature", index = 0)]
fn four_points_two_days(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/itinerary_planning.feature", index = 1)]
fn lunch_tag(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/itinerary_planning.feature", index = 2)]
fn unlocated_points_trail(world: PlanningWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/itinerary_planning.feature", index = 3)]
fn zero_days(world: PlanningWorld) {
    let _ = world;
}
