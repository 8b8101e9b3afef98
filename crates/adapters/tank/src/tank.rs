//! The tank: a tracked vehicle with drive motors and an RGB light bar.

use std::time::Duration;

use thingkit_app::registry::{BoxedThing, DeviceRegistry};
use thingkit_domain::error::{RegistrationError, ThingError};
use thingkit_domain::parameter::{Parameter, ParameterList};
use thingkit_domain::plan::Plan;
use thingkit_domain::thing::DeclaredThing;
use thingkit_domain::value::ValueType;

use crate::command::{
    ChassisCommand, DANCE_ROUTINE, LIGHT_OFF, LIGHT_ON, LIGHT_SHOW, MotionVector,
};

/// Name the tank is registered and addressed under.
pub const TYPE_NAME: &str = "Tank";

const STRAIGHT_HOLD: Duration = Duration::from_millis(500);
const TURN_HOLD: Duration = Duration::from_millis(600);
const LIGHT_SHOW_HOLD: Duration = Duration::from_secs(10);

/// Last direction the tank was asked to move in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    None,
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Forward => "forward",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Device-side state of the tank. `speed` and `brightness` are 0 until set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TankState {
    pub power: bool,
    pub direction: Direction,
    pub speed: u8,
    pub brightness: u8,
}

/// The tank's capability declaration.
pub type Tank = DeclaredThing<TankState, ChassisCommand>;

type Outcome = Result<Plan<ChassisCommand>, ThingError>;

/// Build a tank with fresh state.
///
/// # Errors
///
/// Only fails if the declaration itself contains a duplicate name.
pub fn tank() -> Result<Tank, RegistrationError> {
    let none = ParameterList::new;
    Ok(DeclaredThing::new(
        TYPE_NAME,
        "Tracked tank with drive motors and a light bar",
        TankState::default(),
    )
    .boolean_property("power", "Whether the tank lights are on", |s: &TankState| {
        s.power
    })?
    .number_property("speed", "Drive speed, 0 until set", |s: &TankState| {
        f64::from(s.speed)
    })?
    .string_property("direction", "Last requested direction", |s: &TankState| {
        s.direction.as_str().to_string()
    })?
    .number_property("brightness", "Light brightness, 0 until set", |s: &TankState| {
        f64::from(s.brightness)
    })?
    .method("TurnOn", "Turn the tank lights on", none(), turn_on)?
    .method("TurnOff", "Turn the tank lights off", none(), turn_off)?
    .method("GoForward", "Drive forward briefly", none(), go_forward)?
    .method("GoBack", "Drive backward briefly", none(), go_back)?
    .method("GoLeft", "Turn left briefly", none(), go_left)?
    .method("GoRight", "Turn right briefly", none(), go_right)?
    .method("GoDance", "Start the dance routine", none(), go_dance)?
    .method("LightShow", "Run the light show", none(), light_show)?
    .method(
        "SetSpeed",
        "Set the drive speed",
        percent("speed", "Integer between 1 and 100")?,
        set_speed,
    )?
    .method(
        "SetBrightness",
        "Set the light brightness",
        percent("brightness", "Integer between 1 and 100")?,
        set_brightness,
    )?
    .on_startup(Plan::none().issue(ChassisCommand::Start)))
}

/// Register the tank under [`TYPE_NAME`].
///
/// # Errors
///
/// Returns [`RegistrationError::DuplicateDeviceType`] if the name is taken.
pub fn register(registry: &mut DeviceRegistry<ChassisCommand>) -> Result<(), RegistrationError> {
    registry.register(TYPE_NAME, || -> Result<BoxedThing<ChassisCommand>, ThingError> {
        Ok(Box::new(tank()?))
    })
}

fn turn_on(state: &mut TankState, _: &ParameterList) -> Outcome {
    state.power = true;
    Ok(Plan::none().issue(ChassisCommand::RgbLight(LIGHT_ON)))
}

fn turn_off(state: &mut TankState, _: &ParameterList) -> Outcome {
    state.power = false;
    Ok(Plan::none().issue(ChassisCommand::RgbLight(LIGHT_OFF)))
}

fn go_forward(state: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(drive(state, Direction::Forward, MotionVector::FORWARD, STRAIGHT_HOLD))
}

fn go_back(state: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(drive(state, Direction::Back, MotionVector::BACK, STRAIGHT_HOLD))
}

fn go_left(state: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(drive(state, Direction::Left, MotionVector::LEFT, TURN_HOLD))
}

fn go_right(state: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(drive(state, Direction::Right, MotionVector::RIGHT, TURN_HOLD))
}

fn go_dance(_: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(Plan::none().issue(ChassisCommand::DanceMode(DANCE_ROUTINE)))
}

fn light_show(_: &mut TankState, _: &ParameterList) -> Outcome {
    Ok(Plan::none()
        .issue(ChassisCommand::RgbLight(LIGHT_SHOW))
        .hold(LIGHT_SHOW_HOLD)
        .issue(ChassisCommand::RgbLight(LIGHT_OFF)))
}

// The chassis has no closed-loop speed or brightness control; these commands
// are advisory and the controller decides what to do with them.
fn set_speed(state: &mut TankState, parameters: &ParameterList) -> Outcome {
    state.speed = parameters.byte("speed")?;
    tracing::info!(speed = state.speed, "speed set");
    Ok(Plan::none().issue(ChassisCommand::Speed(state.speed)))
}

fn set_brightness(state: &mut TankState, parameters: &ParameterList) -> Outcome {
    state.brightness = parameters.byte("brightness")?;
    tracing::info!(brightness = state.brightness, "brightness set");
    Ok(Plan::none().issue(ChassisCommand::Brightness(state.brightness)))
}

/// Move, hold, stop.
fn drive(
    state: &mut TankState,
    direction: Direction,
    vector: MotionVector,
    hold: Duration,
) -> Plan<ChassisCommand> {
    state.direction = direction;
    Plan::none()
        .issue(ChassisCommand::Motion(vector))
        .hold(hold)
        .issue(ChassisCommand::Motion(MotionVector::STOP))
}

/// A required whole number limited to 1..=100.
fn percent(name: &str, description: &str) -> Result<ParameterList, RegistrationError> {
    ParameterList::from_parameters([Parameter::new(name, description, ValueType::Number, true)
        .integral()
        .with_range(1.0..=100.0)])
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use thingkit_app::services::thing_manager::ThingManager;
    use thingkit_domain::parameter::Arguments;
    use thingkit_domain::thing::Thing;
    use thingkit_domain::value::Value;

    use super::*;
    use crate::chassis::SimulatedChassis;

    async fn online() -> (Arc<SimulatedChassis>, Arc<ThingManager<Arc<SimulatedChassis>>>) {
        let chassis = Arc::new(SimulatedChassis::new());
        let manager = Arc::new(ThingManager::new(Arc::clone(&chassis)));
        let mut registry = DeviceRegistry::new();
        register(&mut registry).unwrap();
        manager.instantiate(&registry, TYPE_NAME).await.unwrap();
        (chassis, manager)
    }

    async fn call(
        manager: &ThingManager<Arc<SimulatedChassis>>,
        method: &str,
    ) -> Result<Option<Value>, ThingError> {
        manager
            .invoke_method(TYPE_NAME, method, Arguments::none())
            .await
            .map(|outcome| outcome.result)
    }

    #[test]
    fn should_declare_four_properties_and_ten_methods() {
        let descriptor = tank().unwrap().descriptor();
        let properties: Vec<_> = descriptor.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(properties, vec!["power", "speed", "direction", "brightness"]);
        assert_eq!(descriptor.methods.len(), 10);
    }

    #[tokio::test]
    async fn should_start_chassis_when_brought_online() {
        let (chassis, _) = online().await;
        assert_eq!(chassis.commands(), vec![ChassisCommand::Start]);
    }

    #[tokio::test]
    async fn should_report_power_after_turn_on_and_off() {
        let (chassis, manager) = online().await;

        call(&manager, "TurnOn").await.unwrap();
        assert_eq!(manager.read_property(TYPE_NAME, "power").unwrap(), Value::Boolean(true));
        assert_eq!(chassis.state().light, Some(LIGHT_ON));

        call(&manager, "TurnOff").await.unwrap();
        assert_eq!(manager.read_property(TYPE_NAME, "power").unwrap(), Value::Boolean(false));
        assert_eq!(chassis.state().light, Some(LIGHT_OFF));
    }

    #[tokio::test(start_paused = true)]
    async fn should_go_forward_without_touching_power() {
        let (chassis, manager) = online().await;
        call(&manager, "GoForward").await.unwrap();

        assert_eq!(manager.read_property(TYPE_NAME, "power").unwrap(), Value::Boolean(false));
        assert_eq!(
            manager.read_property(TYPE_NAME, "direction").unwrap(),
            Value::from("forward")
        );
        assert_eq!(
            chassis.timeline()[1..],
            [
                (Duration::ZERO, ChassisCommand::Motion(MotionVector::FORWARD)),
                (STRAIGHT_HOLD, ChassisCommand::Motion(MotionVector::STOP)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_turn_left_then_stop_after_600ms() {
        let (chassis, manager) = online().await;
        call(&manager, "GoLeft").await.unwrap();

        assert_eq!(
            chassis.timeline(),
            vec![
                (Duration::ZERO, ChassisCommand::Start),
                (Duration::ZERO, ChassisCommand::Motion(MotionVector::LEFT)),
                (Duration::from_millis(600), ChassisCommand::Motion(MotionVector::STOP)),
            ]
        );
        assert!(chassis.state().motion.is_stop());
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_interleave_concurrent_moves() {
        let (chassis, manager) = online().await;
        let left = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { call(&manager, "GoLeft").await }
        });
        let back = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { call(&manager, "GoBack").await }
        });
        left.await.unwrap().unwrap();
        back.await.unwrap().unwrap();

        assert_eq!(
            chassis.commands()[1..],
            [
                ChassisCommand::Motion(MotionVector::LEFT),
                ChassisCommand::Motion(MotionVector::STOP),
                ChassisCommand::Motion(MotionVector::BACK),
                ChassisCommand::Motion(MotionVector::STOP),
            ]
        );
        assert_eq!(
            manager.read_property(TYPE_NAME, "direction").unwrap(),
            Value::from("back")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_light_show_for_ten_seconds() {
        let (chassis, manager) = online().await;
        call(&manager, "LightShow").await.unwrap();
        assert_eq!(
            chassis.timeline()[1..],
            [
                (Duration::ZERO, ChassisCommand::RgbLight(LIGHT_SHOW)),
                (Duration::from_secs(10), ChassisCommand::RgbLight(LIGHT_OFF)),
            ]
        );
    }

    #[tokio::test]
    async fn should_start_dance_without_stopping() {
        let (chassis, manager) = online().await;
        call(&manager, "GoDance").await.unwrap();
        assert_eq!(
            chassis.commands(),
            vec![ChassisCommand::Start, ChassisCommand::DanceMode(DANCE_ROUTINE)]
        );
    }

    #[tokio::test]
    async fn should_store_speed_and_forward_advisory_command() {
        let (chassis, manager) = online().await;
        manager
            .invoke_method(TYPE_NAME, "SetSpeed", Arguments::none().with("speed", 40))
            .await
            .unwrap();
        assert_eq!(manager.read_property(TYPE_NAME, "speed").unwrap(), Value::Number(40.0));
        assert_eq!(chassis.state().speed, Some(40));
    }

    #[tokio::test]
    async fn should_reject_speed_out_of_range_without_state_change() {
        let (chassis, manager) = online().await;
        let err = manager
            .invoke_method(TYPE_NAME, "SetSpeed", Arguments::none().with("speed", 150))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "argument_range");
        assert_eq!(manager.read_property(TYPE_NAME, "speed").unwrap(), Value::Number(0.0));
        assert_eq!(chassis.commands(), vec![ChassisCommand::Start]);
    }

    #[tokio::test]
    async fn should_reject_fractional_speed_instead_of_truncating() {
        let (chassis, manager) = online().await;
        let err = manager
            .invoke_method(TYPE_NAME, "SetSpeed", Arguments::none().with("speed", 50.7))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "argument_type");
        assert_eq!(manager.read_property(TYPE_NAME, "speed").unwrap(), Value::Number(0.0));
        assert_eq!(chassis.commands(), vec![ChassisCommand::Start]);
    }

    #[tokio::test]
    async fn should_store_brightness() {
        let (chassis, manager) = online().await;
        manager
            .invoke_method(
                TYPE_NAME,
                "SetBrightness",
                Arguments::Positional(vec![Value::from(75)]),
            )
            .await
            .unwrap();
        assert_eq!(
            manager.read_property(TYPE_NAME, "brightness").unwrap(),
            Value::Number(75.0)
        );
        assert_eq!(chassis.state().brightness, Some(75));
    }

    #[tokio::test]
    async fn should_issue_nothing_when_required_parameter_missing() {
        let (chassis, manager) = online().await;
        let err = manager
            .invoke_method(TYPE_NAME, "SetBrightness", Arguments::none())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "missing_argument");
        assert_eq!(chassis.commands(), vec![ChassisCommand::Start]);
    }

    #[tokio::test]
    async fn should_issue_nothing_for_unknown_method_or_extra_argument() {
        let (chassis, manager) = online().await;
        assert_eq!(call(&manager, "Unknown").await.unwrap_err().code(), "method_not_found");

        let err = manager
            .invoke_method(TYPE_NAME, "TurnOn", Arguments::none().with("color", "red"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unknown_argument");
        assert_eq!(chassis.commands(), vec![ChassisCommand::Start]);
    }

    #[tokio::test]
    async fn should_read_same_speed_repeatedly() {
        let (_, manager) = online().await;
        let first = manager.read_property(TYPE_NAME, "speed").unwrap();
        let second = manager.read_property(TYPE_NAME, "speed").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_not_come_online_when_chassis_refuses_start() {
        let chassis = Arc::new(SimulatedChassis::new());
        chassis.reject(ChassisCommand::Start);
        let manager = ThingManager::new(Arc::clone(&chassis));
        let mut registry = DeviceRegistry::new();
        register(&mut registry).unwrap();

        let err = manager.instantiate(&registry, TYPE_NAME).await.unwrap_err();
        assert_eq!(err.code(), "hardware_fault");
        assert!(manager.thing_names().is_empty());
    }

    #[tokio::test]
    async fn should_surface_chassis_fault_as_failed_invocation() {
        let (chassis, manager) = online().await;
        chassis.reject(ChassisCommand::DanceMode(DANCE_ROUTINE));
        assert_eq!(call(&manager, "GoDance").await.unwrap_err().code(), "hardware_fault");
    }

    #[test]
    fn should_reject_registering_twice() {
        let mut registry = DeviceRegistry::new();
        register(&mut registry).unwrap();
        assert_eq!(
            register(&mut registry).unwrap_err(),
            RegistrationError::DuplicateDeviceType(TYPE_NAME.to_string())
        );
    }
}
