// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The DFT on a wgpu device.
//!
//! Each call to [`dft`] selects an adapter, creates its own device, compiles
//! the kernel, uploads the inputs, dispatches once, reads back and releases
//! everything again. Every step blocks.

use std::{borrow::Cow, panic::Location, path::Path};

use log::{debug, info, trace};
use wgpu::util::DeviceExt;

use super::{GpuError, KernelParam, ParamAccess, KERNEL_PARAMS, WORKGROUP_SIZE};
use crate::{
    config::Config,
    data::{ComplexSample, Source, Visibility},
};

/// The kernel compiled when [`Config::kernel_file`] is not set.
pub const BUNDLED_KERNEL: &str = include_str!("../../kernels/direct_fourier_transform.wgsl");
/// The kernel's entry point.
pub const KERNEL_ENTRY_POINT: &str = "dft_kernel";

/// A summary of a wgpu adapter.
#[derive(Debug, Clone)]
pub struct AdapterSummary {
    pub name: String,
    pub driver: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    /// Whether `SHADER_F64` is supported.
    pub has_f64: bool,
}

impl AdapterSummary {
    fn new(adapter: &wgpu::Adapter) -> AdapterSummary {
        let info = adapter.get_info();
        AdapterSummary {
            name: info.name,
            driver: info.driver,
            backend: info.backend,
            device_type: info.device_type,
            has_f64: adapter.features().contains(wgpu::Features::SHADER_F64),
        }
    }
}

impl std::fmt::Display for AdapterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.device_type {
            wgpu::DeviceType::DiscreteGpu => "discrete",
            wgpu::DeviceType::IntegratedGpu => "integrated",
            wgpu::DeviceType::VirtualGpu => "virtual",
            wgpu::DeviceType::Cpu => "cpu",
            wgpu::DeviceType::Other => "other",
        };
        let precision = if self.has_f64 { "f64" } else { "f32 only" };
        write!(
            f,
            "{} ({kind}, {:?}, driver '{}', {precision})",
            self.name, self.backend, self.driver
        )
    }
}

fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

fn is_gpu_class(device_type: wgpu::DeviceType) -> bool {
    matches!(
        device_type,
        wgpu::DeviceType::DiscreteGpu
            | wgpu::DeviceType::IntegratedGpu
            | wgpu::DeviceType::VirtualGpu
    )
}

/// Pick the first GPU-class adapter with f64 support, otherwise the first
/// CPU-class adapter with f64 support.
fn select_adapter(instance: &wgpu::Instance) -> Result<wgpu::Adapter, GpuError> {
    let (gpus, others): (Vec<_>, Vec<_>) = instance
        .enumerate_adapters(wgpu::Backends::all())
        .into_iter()
        .filter(|a| a.features().contains(wgpu::Features::SHADER_F64))
        .partition(|a| is_gpu_class(a.get_info().device_type));

    gpus.into_iter()
        .next()
        .or_else(|| {
            others
                .into_iter()
                .find(|a| a.get_info().device_type == wgpu::DeviceType::Cpu)
        })
        .ok_or(GpuError::NoDevice)
}

/// List all adapters, and the index of the one that would be selected (if
/// any).
pub fn list_adapters() -> (Vec<AdapterSummary>, Option<usize>) {
    let instance = create_instance();
    let summaries: Vec<AdapterSummary> = instance
        .enumerate_adapters(wgpu::Backends::all())
        .iter()
        .map(AdapterSummary::new)
        .collect();
    let selected = select_adapter(&instance).ok().and_then(|chosen| {
        let chosen = AdapterSummary::new(&chosen);
        summaries.iter().position(|s| {
            s.name == chosen.name && s.backend == chosen.backend && s.driver == chosen.driver
        })
    });
    (summaries, selected)
}

/// Get a formatted string with information on the adapter that would be
/// used.
pub(crate) fn get_device_info() -> Result<String, GpuError> {
    let adapter = select_adapter(&create_instance())?;
    Ok(AdapterSummary::new(&adapter).to_string())
}

/// Get the kernel source to compile.
fn kernel_source(kernel_file: Option<&Path>) -> Result<Cow<'static, str>, GpuError> {
    match kernel_file {
        Some(file) => {
            debug!("Reading kernel source from {}", file.display());
            std::fs::read_to_string(file)
                .map(Cow::Owned)
                .map_err(|err| GpuError::KernelFile {
                    file: file.display().to_string(),
                    err,
                })
        }
        None => Ok(Cow::Borrowed(BUNDLED_KERNEL)),
    }
}

fn to_u32(count: usize, what: &'static str) -> Result<u32, GpuError> {
    u32::try_from(count).map_err(|_| GpuError::TooMany { what, count })
}

/// Everything created on the device for one DFT. The fields are dropped in
/// declaration order: the kernel pipeline, the buffers, the queue, the
/// program and finally the execution context.
pub struct DeviceResources {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    visibilities: wgpu::Buffer,
    output: wgpu::Buffer,
    sources: wgpu::Buffer,
    num_visibilities: wgpu::Buffer,
    num_sources: wgpu::Buffer,
    queue: wgpu::Queue,
    // Held so that the program outlives the pipeline.
    #[allow(dead_code)]
    module: wgpu::ShaderModule,
    device: wgpu::Device,

    num_visibilities_u32: u32,
}

impl DeviceResources {
    /// Select a device and create a context, compile the kernel, upload the
    /// inputs and bind them to the kernel's parameters.
    pub fn new(
        config: &Config,
        sources: &[Source],
        visibilities: &[Visibility],
        samples: &[ComplexSample],
    ) -> Result<DeviceResources, GpuError> {
        let num_visibilities_u32 = to_u32(visibilities.len(), "visibilities")?;
        let num_sources_u32 = to_u32(sources.len(), "sources")?;

        let adapter = select_adapter(&create_instance())?;
        let summary = AdapterSummary::new(&adapter);
        if config.enable_messages {
            info!("Using device: {summary}");
        }

        // No optional features (e.g. timestamp queries); the queue is plain
        // and in-order.
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("DFT device"),
                required_features: wgpu::Features::SHADER_F64,
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))?;

        let source = kernel_source(config.kernel_file.as_deref())?;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("DFT kernel"),
            source: wgpu::ShaderSource::Wgsl(source),
        });
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::KernelCompile(e.to_string()));
        }
        trace!("Compiled the DFT kernel");

        if config.enable_messages {
            info!("Allocating GPU memory");
        }
        let buffer_init = |label: &str, contents: &[u8], usage: wgpu::BufferUsages| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
        };
        let visibilities_buffer = buffer_init(
            "visibilities",
            bytemuck::cast_slice(visibilities),
            wgpu::BufferUsages::STORAGE,
        );
        // Zero-sized bindings are invalid, so an empty source list is bound
        // as a single dummy source that the kernel never reads.
        let dummy = [Source::default()];
        let sources_buffer = buffer_init(
            "sources",
            bytemuck::cast_slice(if sources.is_empty() { &dummy } else { sources }),
            wgpu::BufferUsages::STORAGE,
        );
        let output_buffer = buffer_init(
            "output",
            bytemuck::cast_slice(samples),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let num_visibilities_buffer = buffer_init(
            "num_visibilities",
            bytemuck::bytes_of(&num_visibilities_u32),
            wgpu::BufferUsages::UNIFORM,
        );
        let num_sources_buffer = buffer_init(
            "num_sources",
            bytemuck::bytes_of(&num_sources_u32),
            wgpu::BufferUsages::UNIFORM,
        );

        let (pipeline, bind_group) = {
            let buffer_for = |param: KernelParam| match param {
                KernelParam::Visibilities => &visibilities_buffer,
                KernelParam::Output => &output_buffer,
                KernelParam::VisibilityCount => &num_visibilities_buffer,
                KernelParam::Sources => &sources_buffer,
                KernelParam::SourceCount => &num_sources_buffer,
            };
            let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = KERNEL_PARAMS
                .iter()
                .enumerate()
                .map(|(binding, param)| wgpu::BindGroupLayoutEntry {
                    binding: binding as u32,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: match param.access() {
                            ParamAccess::Read => {
                                wgpu::BufferBindingType::Storage { read_only: true }
                            }
                            ParamAccess::ReadWrite => {
                                wgpu::BufferBindingType::Storage { read_only: false }
                            }
                            ParamAccess::Uniform => wgpu::BufferBindingType::Uniform,
                        },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                })
                .collect();
            let group_entries: Vec<wgpu::BindGroupEntry> = KERNEL_PARAMS
                .iter()
                .enumerate()
                .map(|(binding, param)| wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource: buffer_for(*param).as_entire_binding(),
                })
                .collect();

            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("DFT kernel parameters"),
                    entries: &layout_entries,
                });
            let pipeline_layout =
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("DFT kernel"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });
            let pipeline =
                device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("DFT kernel"),
                    layout: Some(&pipeline_layout),
                    module: &module,
                    entry_point: KERNEL_ENTRY_POINT,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    cache: None,
                });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("DFT kernel parameters"),
                layout: &bind_group_layout,
                entries: &group_entries,
            });
            if let Some(e) = pollster::block_on(device.pop_error_scope()) {
                return Err(GpuError::Pipeline(e.to_string()));
            }
            (pipeline, bind_group)
        };

        Ok(DeviceResources {
            pipeline,
            bind_group,
            visibilities: visibilities_buffer,
            output: output_buffer,
            sources: sources_buffer,
            num_visibilities: num_visibilities_buffer,
            num_sources: num_sources_buffer,
            queue,
            module,
            device,
            num_visibilities_u32,
        })
    }

    /// The number of workgroups to dispatch in x and y. x is capped by the
    /// device limit and the kernel spreads the remainder over y.
    fn workgroups(&self) -> (u32, u32) {
        let total = self.num_visibilities_u32.div_ceil(WORKGROUP_SIZE).max(1);
        let max_x = self
            .device
            .limits()
            .max_compute_workgroups_per_dimension
            .max(1);
        let x = total.min(max_x);
        (x, total.div_ceil(x))
    }

    /// Dispatch the kernel once, block until it completes and copy the output
    /// into `samples`.
    #[track_caller]
    pub fn run(&self, config: &Config, samples: &mut [ComplexSample]) -> Result<(), GpuError> {
        let location = Location::caller();
        let (x, y) = self.workgroups();
        debug!("Dispatching {x}x{y} workgroups of {WORKGROUP_SIZE}");
        if config.enable_messages {
            info!("Calling DFT GPU kernel");
        }

        let size = self.output.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("DFT"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("DFT"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(x, y, 1);
        }
        encoder.copy_buffer_to_buffer(&self.output, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver.recv().map_err(|_| GpuError::Readback {
            msg: "the map callback was never called".into(),
            file: location.file(),
            line: location.line(),
        })??;
        if config.enable_messages {
            info!("DFT GPU kernel completed");
        }

        {
            let data = slice.get_mapped_range();
            let computed =
                bytemuck::try_cast_slice::<u8, ComplexSample>(&data).map_err(|e| GpuError::Readback {
                    msg: e.to_string().into(),
                    file: location.file(),
                    line: location.line(),
                })?;
            if computed.len() != samples.len() {
                return Err(GpuError::Readback {
                    msg: format!(
                        "expected {} samples, but the device returned {}",
                        samples.len(),
                        computed.len()
                    )
                    .into(),
                    file: location.file(),
                    line: location.line(),
                });
            }
            samples.copy_from_slice(computed);
        }
        staging.unmap();

        if config.enable_messages {
            info!("Copied visibility data back to host");
        }
        Ok(())
    }
}

impl Drop for DeviceResources {
    fn drop(&mut self) {
        trace!(
            "Releasing device resources ({} + {} + {} + {} + {} bytes of buffers)",
            self.visibilities.size(),
            self.output.size(),
            self.sources.size(),
            self.num_visibilities.size(),
            self.num_sources.size(),
        );
    }
}

/// Run the DFT on a wgpu device, overwriting `samples`.
pub(super) fn dft(
    config: &Config,
    sources: &[Source],
    visibilities: &[Visibility],
    samples: &mut [ComplexSample],
) -> Result<(), GpuError> {
    let resources = DeviceResources::new(config, sources, visibilities, samples)?;
    resources.run(config, samples)
}
