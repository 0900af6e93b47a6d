/// Errors reported by the framework
///
/// Configuration errors are reported by constructors and init-time registration. Runtime
/// violations detected inside event dispatch are not reported with this type: they abort.
#[derive(Debug, Clone, Copy, Eq, PartialEq, defmt::Format)]
pub enum Error {
    /// No free slot in a memory pool
    NoMemory,
    /// Too many listeners registered in an event bus
    TooManyListeners,
    /// Too many subscriptions for a single event type
    TooManySubscriptions,
    /// A listener subscribed twice to the same event type
    DuplicateSubscription,
    /// Second listener subscribed as the first one for an event type
    DuplicateFirstSubscriber,
    /// Second listener subscribed as the final one for an event type
    DuplicateFinalSubscriber,
    /// The module identifier is already registered
    DuplicateModule,
    /// The module identifier was never registered
    UnknownModule,
    /// Too many modules registered in the module state tracker
    TooManyModules,
    /// LED effect without any step
    EmptyEffect,
    /// LED effect with more steps than supported
    TooManySteps,
    /// Looping LED effect whose steps take no time
    ZeroDurationLoop,
    /// The LED identifier is not configured
    UnknownLed,
    /// Too many LEDs configured
    TooManyLeds,
    /// The LED identifier is configured twice
    DuplicateLed,
    /// The output channel does not exist in the LED driver
    InvalidChannel,
    /// Too many keys configured in the click detector
    TooManyKeys,
    /// The key identifier is configured twice
    DuplicateKey,
    /// Click thresholds are inconsistent
    InvalidThresholds,
    /// Too many sensor descriptors configured in the aggregator
    TooManyAggregators,
    /// The sensor descriptor is not handled by the aggregator
    UnknownDescriptor,
    /// The sensor descriptor is configured twice
    DuplicateDescriptor,
    /// Requested buffer capacity is zero or exceeds the supported maximum
    InvalidCapacity,
    /// Sensor sample has more channels than supported
    TooManyChannels,
    /// Every buffer of the sensor descriptor is full or owned by a consumer
    NoBufferAvailable,
    /// The released buffer is not owned by a consumer
    NotInFlight,
}
