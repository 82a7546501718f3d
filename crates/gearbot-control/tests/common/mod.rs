pub mod mock_actuator;
